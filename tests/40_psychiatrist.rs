mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{routine_body, TestApp, TestUser};
use habitual_api::database::models::Role;

/// Psychiatrist `p` is assigned to patient `a`; `q` has no patients; `b` is unassigned
struct CareTeam {
    app: TestApp,
    p: TestUser,
    q: TestUser,
    a: TestUser,
    b: TestUser,
}

async fn care_team() -> Result<CareTeam> {
    let app = TestApp::new();
    let p = app.seed_profile(Role::Psychiatrist, "Pia").await?;
    let q = app.seed_profile(Role::Psychiatrist, "Quinn").await?;
    let a = app.seed_profile(Role::User, "Avery").await?;
    let b = app.seed_profile(Role::User, "Blake").await?;
    app.assign(&p, &a).await?;
    Ok(CareTeam { app, p, q, a, b })
}

fn report_body(patient: &TestUser, private: bool) -> Value {
    json!({
        "user_id": patient.id,
        "title": "Session notes",
        "content": "Sleeping better, still anxious before work.",
        "session_date": "2025-03-14",
        "recommendations": "Keep the evening routine",
        "is_private": private,
    })
}

fn ids(res: &Value) -> Vec<String> {
    res.as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn patient_list_is_assignment_scoped() -> Result<()> {
    let t = care_team().await?;

    let res = t.app.get("/api/psychiatrist/patients", &t.p).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(ids(res.data()), vec![t.a.id.to_string()]);

    let res = t.app.get("/api/psychiatrist/patients", &t.q).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data(), &json!([]));

    let res = t.app.get("/api/psychiatrist/patients", &t.a).await?;
    res.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Psychiatrist access required");
    Ok(())
}

#[tokio::test]
async fn assigned_psychiatrist_reads_but_cannot_write_patient_data() -> Result<()> {
    let t = care_team().await?;
    let created = t.app.post("/api/routines", &t.a, routine_body("Breathing", "07:00")).await?;
    let routine_uri = format!("/api/routines/{}", created.data()["id"].as_str().unwrap_or_default());
    t.app.post("/api/moods", &t.a, json!({ "mood": "stressed" })).await?;

    let res = t.app.get(&format!("/api/routines?user_id={}", t.a.id), &t.p).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()[0]["title"], "Breathing");

    let res = t.app.get(&format!("/api/moods?user_id={}", t.a.id), &t.p).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()[0]["mood"], "stressed");

    t.app
        .patch(&routine_uri, &t.p, json!({ "completed": true }))
        .await?
        .assert_status(StatusCode::NOT_FOUND);

    t.app
        .get(&format!("/api/routines?user_id={}", t.a.id), &t.q)
        .await?
        .assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn reports_require_an_assignment() -> Result<()> {
    let t = care_team().await?;

    let res = t.app.post("/api/psychiatrist/reports", &t.p, report_body(&t.b, true)).await?;
    res.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Patient is not assigned to you");

    let res = t.app.post("/api/psychiatrist/reports", &t.a, report_body(&t.a, true)).await?;
    res.assert_status(StatusCode::FORBIDDEN);

    let res = t.app.post("/api/psychiatrist/reports", &t.p, report_body(&t.a, true)).await?;
    res.assert_status(StatusCode::CREATED);
    assert_eq!(res.data()["psychiatrist_id"], json!(t.p.id));
    assert_eq!(res.data()["user_name"], "Avery");
    assert_eq!(res.data()["psychiatrist_email"], "pia@example.com");
    assert_eq!(res.data()["is_private"], true);
    Ok(())
}

#[tokio::test]
async fn private_reports_stay_between_patient_and_author() -> Result<()> {
    let t = care_team().await?;
    let private = t.app.post("/api/psychiatrist/reports", &t.p, report_body(&t.a, true)).await?;
    let shared = t.app.post("/api/psychiatrist/reports", &t.p, report_body(&t.a, false)).await?;
    let private_id = private.data()["id"].as_str().unwrap_or_default().to_string();
    let shared_id = shared.data()["id"].as_str().unwrap_or_default().to_string();

    // The patient sees both reports about them
    let res = t.app.get("/api/reports", &t.a).await?;
    let mut seen = ids(res.data());
    seen.sort();
    let mut both = vec![private_id.clone(), shared_id.clone()];
    both.sort();
    assert_eq!(seen, both);

    // A second assigned psychiatrist only sees the shared one
    t.app.assign(&t.q, &t.a).await?;
    let res = t.app.get(&format!("/api/psychiatrist/patients/{}/reports", t.a.id), &t.q).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(ids(res.data()), vec![shared_id.clone()]);

    t.app
        .get(&format!("/api/reports/{}", private_id), &t.q)
        .await?
        .assert_status(StatusCode::FORBIDDEN);
    t.app
        .get(&format!("/api/reports/{}", shared_id), &t.q)
        .await?
        .assert_status(StatusCode::OK);

    // The shared report shows up for the second psychiatrist through the query too
    let res = t.app.get(&format!("/api/reports?user_id={}", t.a.id), &t.q).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(ids(res.data()), vec![shared_id.clone()]);

    // Another patient asking about A sees nothing, and has nothing of their own
    let res = t.app.get(&format!("/api/reports?user_id={}", t.a.id), &t.b).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data(), &json!([]));
    let res = t.app.get("/api/reports", &t.b).await?;
    assert_eq!(res.data(), &json!([]));
    Ok(())
}

#[tokio::test]
async fn only_the_author_edits_a_report() -> Result<()> {
    let t = care_team().await?;
    t.app.assign(&t.q, &t.a).await?;
    let created = t.app.post("/api/psychiatrist/reports", &t.p, report_body(&t.a, false)).await?;
    let uri = format!("/api/psychiatrist/reports/{}", created.data()["id"].as_str().unwrap_or_default());

    t.app
        .patch(&uri, &t.q, json!({ "diagnosis": "Overruled" }))
        .await?
        .assert_status(StatusCode::FORBIDDEN);
    t.app.delete(&uri, &t.q).await?.assert_status(StatusCode::FORBIDDEN);

    let res = t.app.patch(&uri, &t.p, json!({ "diagnosis": "GAD" })).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["diagnosis"], "GAD");

    let res = t.app.patch(&uri, &t.p, json!({ "diagnosis": null, "follow_up_date": null })).await?;
    res.assert_status(StatusCode::OK);
    assert!(res.data()["diagnosis"].is_null());
    assert_eq!(res.data()["recommendations"], "Keep the evening routine");

    let res = t.app.delete(&uri, &t.p).await?;
    assert_eq!(res.data()["deleted"], 1);
    let res = t.app.delete(&uri, &t.p).await?;
    assert_eq!(res.data()["deleted"], 0);
    Ok(())
}

#[tokio::test]
async fn patient_detail_summarizes_activity() -> Result<()> {
    let t = care_team().await?;
    let created = t.app.post("/api/routines", &t.a, routine_body("Walk", "08:00")).await?;
    let routine_id = created.data()["id"].as_str().unwrap_or_default().to_string();
    t.app.post("/api/routines", &t.a, routine_body("Read", "21:00")).await?;
    t.app
        .put(&format!("/api/routines/{}/completion", routine_id), &t.a, json!({ "completed": true }))
        .await?;
    t.app
        .put("/api/analytics", &t.a, json!({ "date": "2025-03-10", "planned_hours": 8, "completed_hours": 6 }))
        .await?;
    t.app.post("/api/psychiatrist/reports", &t.p, report_body(&t.a, true)).await?;

    let res = t.app.get(&format!("/api/psychiatrist/patients/{}", t.a.id), &t.p).await?;
    res.assert_status(StatusCode::OK);
    let detail = res.data();
    assert_eq!(detail["total_routines"], 2);
    assert_eq!(detail["completed_routines"], 1);
    assert_eq!(detail["productivity_rate"], 75);
    assert_eq!(detail["total_reports"], 1);
    assert_eq!(detail["last_session_date"], "2025-03-14");

    t.app
        .get(&format!("/api/psychiatrist/patients/{}", t.b.id), &t.p)
        .await?
        .assert_status(StatusCode::FORBIDDEN);

    let res = t.app.get("/api/psychiatrist/patients/stats", &t.p).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));
    Ok(())
}
