use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, Months, Utc};
use serde_json::{Value, json};
use uuid::Uuid;
use visa_intake::api_scope;
use visa_intake::auth::{Claims, encode_token};
use visa_intake::domain::auth::{AuthenticatedUser, Role};
use visa_intake::domain::types::UserId;
use visa_intake::models::config::ServerConfig;
use visa_intake::repository::DieselRepository;

mod common;

const SECRET: &str = "routes-test-secret";

fn config() -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".into(),
        port: 0,
        database_url: String::new(),
        jwt_secret: SECRET.into(),
    }
}

fn bearer(id: &str, role: Role) -> (header::HeaderName, String) {
    let user = AuthenticatedUser {
        id: UserId::new(id).unwrap(),
        email: format!("{id}@example.com"),
        name: Some("Moussa".into()),
        role,
    };
    let token = encode_token(&Claims::for_user(&user, Duration::hours(1)), SECRET).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn date(offset_days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset_days))
        .format("%Y-%m-%d")
        .to_string()
}

fn general_info() -> Value {
    json!({
        "email": "awa@example.com",
        "phone": "+222 22 12 34 56",
        "travelPurpose": "tourism",
        "arrivalDate": date(30),
        "numberOfEntries": "double",
        "addressInMauritania": "Tevragh Zeina, Nouakchott",
        "purposeDescription": "Visiting family and attending a wedding in Nouakchott."
    })
}

fn passport_info() -> Value {
    let expiry = Utc::now()
        .date_naive()
        .checked_add_months(Months::new(60))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string();
    json!({
        "documentNumber": "A1234567",
        "documentType": "standard",
        "issueDate": date(-365),
        "expiryDate": expiry,
        "placeOfIssue": "Dakar"
    })
}

fn traveler_info() -> Value {
    json!({
        "title": "mrs",
        "firstName": "Awa",
        "lastName": "Diallo",
        "birthDate": "1990-05-20",
        "birthPlace": "Dakar",
        "nationality": "Senegalese",
        "gender": "female",
        "maritalStatus": "single",
        "occupation": "Engineer"
    })
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .service(api_scope())
                .app_data(web::Data::new(DieselRepository::new($db.pool())))
                .app_data(web::Data::new(config())),
        )
        .await
    };
}

#[actix_web::test]
async fn test_wizard_flow_submits_one_pending_application() {
    let db = common::TestDb::new("test_wizard_flow_submits_one_pending_application.db");
    let app = app!(db);
    let applicant = bearer("user-1", Role::User);
    let draft_key = Uuid::new_v4();

    let body = json!({ "generalInfo": general_info(), "step": 1, "idempotencyKey": draft_key });
    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-draft")
        .insert_header(applicant.clone())
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved: Value = test::read_body_json(resp).await;
    assert_eq!(saved["message"], "Draft saved successfully");
    let application_id = saved["applicationId"].as_str().unwrap().to_string();

    // Replaying the same key lands on the same draft.
    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-draft")
        .insert_header(applicant.clone())
        .set_json(&body)
        .to_request();
    let replay: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(replay["applicationId"], application_id.as_str());

    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-passport-draft")
        .insert_header(applicant.clone())
        .set_json(json!({
            "passportInfo": passport_info(),
            "applicationId": application_id,
            "step": 2,
            "idempotencyKey": Uuid::new_v4()
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-traveler-draft")
        .insert_header(applicant.clone())
        .set_json(json!({
            "travelerInfo": traveler_info(),
            "applicationId": application_id,
            "step": 3
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let submit_key = Uuid::new_v4();
    let create = json!({
        "applicationId": application_id,
        "generalInfo": general_info(),
        "passportInfo": passport_info(),
        "travelerInfo": traveler_info(),
        "idempotencyKey": submit_key
    });
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/visa-application/create")
            .insert_header(applicant.clone())
            .set_json(&create)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["message"], "Visa application created successfully");
        assert_eq!(created["applicationId"], application_id.as_str());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/visa-application/{application_id}"))
        .insert_header(applicant.clone())
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    let application = &detail["application"];
    assert_eq!(application["status"], "pending");
    assert_eq!(application["histories"].as_array().unwrap().len(), 1);
    assert_eq!(application["histories"][0]["comment"], "Application submitted");
    assert_eq!(application["travelerInfo"]["lastName"], "Diallo");

    let req = test::TestRequest::get()
        .uri("/api/visa-application/list")
        .insert_header(applicant.clone())
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list["applications"].as_array().unwrap().len(), 1);

    // Pending applications are still editable by the applicant.
    let req = test::TestRequest::put()
        .uri(&format!("/api/visa-application/{application_id}"))
        .insert_header(applicant.clone())
        .set_json(json!({ "visaTypeId": "business-90" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["application"]["visaTypeId"], "business-90");
}

#[actix_web::test]
async fn test_admin_status_update_writes_history() {
    let db = common::TestDb::new("test_admin_status_update_writes_history.db");
    let app = app!(db);
    let applicant = bearer("user-1", Role::User);
    let admin = bearer("admin-1", Role::Admin);

    let req = test::TestRequest::post()
        .uri("/api/visa-application/create")
        .insert_header(applicant.clone())
        .set_json(json!({
            "generalInfo": general_info(),
            "passportInfo": passport_info(),
            "travelerInfo": traveler_info()
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let application_id = created["applicationId"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/admin/stats")
        .insert_header(applicant.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/admin/update-status")
        .insert_header(admin.clone())
        .set_json(json!({ "applicationId": application_id, "status": "processing" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["message"], "Statut mis à jour avec succès");
    let application = &updated["application"];
    assert_eq!(application["status"], "processing");
    assert!(!application["processedAt"].is_null());
    assert_eq!(application["histories"].as_array().unwrap().len(), 2);
    assert_eq!(
        application["histories"][0]["comment"],
        "Statut changé par l'administrateur Moussa"
    );

    // Processing applications are locked for the applicant.
    let req = test::TestRequest::put()
        .uri(&format!("/api/visa-application/{application_id}"))
        .insert_header(applicant.clone())
        .set_json(json!({ "visaTypeId": "business-90" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/admin/applications?status=processing&search=Diallo")
        .insert_header(admin.clone())
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["pagination"]["limit"], 20);

    let req = test::TestRequest::get()
        .uri("/api/admin/stats")
        .insert_header(admin.clone())
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["stats"]["totalApplications"], 1);
    assert_eq!(stats["stats"]["processingApplications"], 1);
    assert_eq!(stats["stats"]["totalUsers"], 1);
}

#[actix_web::test]
async fn test_rejects_missing_token_and_incomplete_bodies() {
    let db = common::TestDb::new("test_rejects_missing_token_and_incomplete_bodies.db");
    let app = app!(db);
    let applicant = bearer("user-1", Role::User);

    let req = test::TestRequest::get()
        .uri("/api/visa-application/list")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized");

    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-draft")
        .insert_header(applicant.clone())
        .set_json(json!({ "step": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Missing required data");

    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-passport-draft")
        .insert_header(applicant.clone())
        .set_json(json!({ "passportInfo": passport_info(), "step": 2 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let mut invalid = general_info();
    invalid["email"] = json!("not-an-email");
    let req = test::TestRequest::post()
        .uri("/api/visa-application/save-draft")
        .insert_header(applicant.clone())
        .set_json(json!({ "generalInfo": invalid, "step": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["email"], "validation.email_invalid");

    let req = test::TestRequest::get()
        .uri(&format!("/api/visa-application/{}", Uuid::new_v4()))
        .insert_header(applicant.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
