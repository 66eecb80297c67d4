//! End-to-end checks against a real Postgres. Skipped unless `DATABASE_URL`
//! points at a database the test may migrate and write to.

use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use crm_backend::{
    models::user::{Role, User},
    services::user_service::NewUser,
    utils::{
        crypto::hash_password,
        token::{encode_token, Claims},
    },
    AppState,
};
use rand::Rng;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "crm_api_test_secret";

struct Harness {
    app: Router,
    state: AppState,
    pool: PgPool,
    tag: String,
}

async fn harness() -> Option<Harness> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").map(|v| v.is_empty()).unwrap_or(true) {
        eprintln!("DATABASE_URL not set; skipping database tests");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", SECRET);
    env::set_var("API_RPS", "10000");
    env::set_var(
        "UPLOADS_DIR",
        env::temp_dir().join("crm-api-test-uploads").display().to_string(),
    );
    let _ = crm_backend::config::init_config();

    let pool = crm_backend::database::pool::create_pool()
        .await
        .expect("pool");
    crm_backend::database::pool::run_migrations(&pool)
        .await
        .expect("migrations");

    let state = AppState::new(pool.clone());
    let app = crm_backend::routes::router(state.clone()).expect("router");
    let tag = format!("t{}", &Uuid::new_v4().simple().to_string()[..10]);
    Some(Harness {
        app,
        state,
        pool,
        tag,
    })
}

fn random_phone() -> String {
    rand::thread_rng()
        .gen_range(6_000_000_000u64..10_000_000_000u64)
        .to_string()
}

impl Harness {
    async fn user(&self, name: &str, role: Role) -> User {
        self.state
            .user_service
            .insert(NewUser {
                first_name: name.to_string(),
                last_name: Some(self.tag.clone()),
                email: format!("{}.{}@example.com", name.to_lowercase(), self.tag),
                phone: Some(random_phone()),
                password: hash_password("password1").unwrap(),
                role,
            })
            .await
            .expect("seed user")
    }

    fn cookie(&self, user: &User) -> String {
        let token = encode_token(&Claims::new(user.id, user.role, 1), SECRET).unwrap();
        format!("auth_token={}", token)
    }

    async fn seed_lead(&self, owner: &User, first_name: &str) -> i32 {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO leads (first_name, last_name, email, phone, gender, dob,
                               assigned_to, created_by, source)
            VALUES ($1, $2, $3, $4, 'FEMALE', '2000-01-15', $5, $5, 'WEBSITE')
            RETURNING id
            "#,
        )
        .bind(first_name)
        .bind(&self.tag)
        .bind(format!("{}.{}@leads.test", first_name.to_lowercase(), self.tag))
        .bind(random_phone())
        .bind(owner.id)
        .fetch_one(&self.pool)
        .await
        .expect("seed lead")
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, HeaderMap, JsonValue) {
        send_to(self.app.clone(), method, uri, cookie, body).await
    }
}

async fn send_to(
    app: Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, HeaderMap, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, headers, json)
}

#[tokio::test]
async fn employee_listing_is_scoped_and_paginated() {
    let Some(h) = harness().await else { return };
    let admin = h.user("Admin", Role::Admin).await;
    let alice = h.user("Alice", Role::Employee).await;
    let bob = h.user("Bob", Role::Employee).await;

    for i in 0..10 {
        h.seed_lead(&alice, &format!("Alead{}", i)).await;
    }
    for i in 0..15 {
        h.seed_lead(&bob, &format!("Blead{}", i)).await;
    }

    let (status, _, body) = h
        .send("GET", "/api/leads?limit=10", Some(&h.cookie(&alice)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let leads = body["leads"].as_array().unwrap();
    assert!(leads.len() <= 10);
    assert!(leads.iter().all(|l| l["assignedTo"] == alice.id));
    assert_eq!(body["pagination"]["totalLeads"], 10);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["pagination"]["currentPage"], 1);

    let uri = format!("/api/leads?search={}&limit=10&page=2", h.tag.to_uppercase());
    let (status, _, body) = h.send("GET", &uri, Some(&h.cookie(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["leads"].as_array().unwrap().len(), 10);
    assert_eq!(body["pagination"]["totalLeads"], 25);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["currentPage"], 2);

    let uri = format!("/api/leads?search={}&limit=10&page=9", h.tag);
    let (status, _, body) = h.send("GET", &uri, Some(&h.cookie(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["leads"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["totalLeads"], 25);
}

#[tokio::test]
async fn filters_and_search_combine_with_and() {
    let Some(h) = harness().await else { return };
    let admin = h.user("Admin", Role::Admin).await;
    let owner = h.user("Owner", Role::Employee).await;

    let hot = h.seed_lead(&owner, "Hotlead").await;
    let warm = h.seed_lead(&owner, "Warmlead").await;
    h.seed_lead(&owner, "Coldlead").await;

    sqlx::query("UPDATE leads SET status = 'CONTACTED', priority = 'HIGH' WHERE id = $1")
        .bind(hot)
        .execute(&h.pool)
        .await
        .unwrap();
    sqlx::query("UPDATE leads SET status = 'CONTACTED' WHERE id = $1")
        .bind(warm)
        .execute(&h.pool)
        .await
        .unwrap();

    let uri = format!(
        "/api/leads?search={}&status=contacted&priority=HIGH&source=",
        h.tag
    );
    let (status, _, body) = h.send("GET", &uri, Some(&h.cookie(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    let leads = body["leads"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["id"], hot);
    assert_eq!(leads[0]["status"], "CONTACTED");
    assert_eq!(leads[0]["priority"], "HIGH");

    let uri = format!("/api/leads?search={}&status=CONTACTED", h.tag);
    let (_, _, body) = h.send("GET", &uri, Some(&h.cookie(&admin)), None).await;
    assert_eq!(body["pagination"]["totalLeads"], 2);

    let (_, _, body) = h
        .send("GET", "/api/leads?search=warmLEAD", Some(&h.cookie(&owner)), None)
        .await;
    let leads = body["leads"].as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["firstName"], "Warmlead");
}

#[tokio::test]
async fn lead_lifecycle_respects_ownership() {
    let Some(h) = harness().await else { return };
    let owner = h.user("Carol", Role::Employee).await;
    let other = h.user("Dave", Role::Employee).await;
    let owner_cookie = h.cookie(&owner);

    let (status, _, body) = h
        .send(
            "POST",
            "/api/leads",
            Some(&owner_cookie),
            Some(json!({
                "firstName": "Nina",
                "lastName": h.tag,
                "phone": random_phone(),
                "gender": "FEMALE",
                "dob": "2001-07-04",
                "source": "referral",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let phone = random_phone();
    let (status, _, body) = h
        .send(
            "POST",
            "/api/leads",
            Some(&owner_cookie),
            Some(json!({
                "firstName": "Nina",
                "lastName": h.tag,
                "phone": phone,
                "gender": "FEMALE",
                "dob": "2001-07-04",
                "source": "REFERRAL",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let lead = &body["lead"];
    let id = lead["id"].as_i64().unwrap();
    assert_eq!(lead["assignedTo"], owner.id);
    assert_eq!(lead["createdBy"], owner.id);
    assert_eq!(lead["status"], "NEW");
    assert_eq!(lead["priority"], "MEDIUM");

    let (status, _, body) = h
        .send(
            "POST",
            "/api/leads",
            Some(&owner_cookie),
            Some(json!({
                "firstName": "Copy",
                "phone": phone,
                "gender": "MALE",
                "dob": "2001-07-04",
                "source": "REFERRAL",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Lead with this phone number already exists");

    let uri = format!("/api/leads/{}", id);
    let (status, _, _) = h.send("GET", &uri, Some(&h.cookie(&other)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = h
        .send(
            "PATCH",
            &format!("/api/leads/{}/status", id),
            Some(&owner_cookie),
            Some(json!({ "status": "QUALIFIED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lead"]["status"], "QUALIFIED");

    let (status, _, _) = h
        .send(
            "PATCH",
            &format!("/api/leads/{}/deactivate", id),
            Some(&owner_cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, body) = h.send("GET", &uri, Some(&owner_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lead"]["isActive"], false);
}

#[tokio::test]
async fn interactions_and_follow_ups() {
    let Some(h) = harness().await else { return };
    let owner = h.user("Erin", Role::Employee).await;
    let cookie = h.cookie(&owner);
    let lead = h.seed_lead(&owner, "Followme").await;

    for (kind, notes) in [("CALL", "first call"), ("EMAIL", "sent brochure")] {
        let (status, _, _) = h
            .send(
                "POST",
                &format!("/api/leads/{}/interactions", lead),
                Some(&cookie),
                Some(json!({ "interactionType": kind, "notes": notes })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _, body) = h
        .send(
            "GET",
            &format!("/api/leads/{}/interactions", lead),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["interactions"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["notes"], "sent brochure");
    assert_eq!(items[0]["interactionBy"]["firstName"], "Erin");

    let (status, _, body) = h
        .send(
            "POST",
            &format!("/api/leads/{}/follow-ups", lead),
            Some(&cookie),
            Some(json!({ "followUpDate": "2031-03-14T09:00:00Z", "notes": "demo" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let follow_up_id = body["followUp"]["id"].as_i64().unwrap();

    let (_, _, body) = h
        .send(
            "GET",
            "/api/follow-ups?date=2031-03-14&completed=false",
            Some(&cookie),
            None,
        )
        .await;
    let rows = body["followUps"].as_array().unwrap();
    assert!(rows.iter().any(|r| r["id"] == follow_up_id));
    assert!(rows.iter().all(|r| r["assignedTo"]["id"] == owner.id));

    let (status, _, body) = h
        .send(
            "PATCH",
            &format!("/api/follow-ups/{}/mark-complete", follow_up_id),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["followUp"]["isCompleted"], true);

    let stranger = h.user("Frank", Role::Employee).await;
    let (status, _, _) = h
        .send(
            "DELETE",
            &format!("/api/follow-ups/{}", follow_up_id),
            Some(&h.cookie(&stranger)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = h
        .send(
            "DELETE",
            &format!("/api/follow-ups/{}", follow_up_id),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_sets_a_cookie_that_validates() {
    let Some(h) = harness().await else { return };
    let email = format!("gina.{}@example.com", h.tag);

    let (status, _, _) = h
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "firstName": "Gina",
                "email": email,
                "password": "hunter22",
                "role": "EMPLOYEE",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = h
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Credentials");

    let (status, headers, body) = h
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email.to_uppercase(), "password": "hunter22" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login Successful");
    assert_eq!(body["role"], "EMPLOYEE");
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let (status, _, validated) = h
        .send("GET", "/api/auth/validate-token", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(validated["userId"], body["userId"]);

    let (_, _, dashboard) = h.send("GET", "/api/dashboard", Some(&cookie), None).await;
    assert_eq!(dashboard["leadStatusCounts"].as_array().unwrap().len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_with_one_phone_store_one_lead() {
    let Some(h) = harness().await else { return };
    let owner = h.user("Hank", Role::Employee).await;
    let cookie = h.cookie(&owner);
    let phone = random_phone();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let app = h.app.clone();
        let cookie = cookie.clone();
        let body = json!({
            "firstName": format!("Racer{}", i),
            "lastName": h.tag,
            "phone": phone,
            "gender": "MALE",
            "dob": "1999-12-31",
            "source": "WEBSITE",
        });
        tasks.spawn(async move {
            send_to(app, "POST", "/api/leads", Some(&cookie), Some(body)).await
        });
    }

    let mut created = 0;
    while let Some(joined) = tasks.join_next().await {
        let (status, _, body) = joined.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => assert_eq!(
                body["message"],
                "Lead with this phone number already exists"
            ),
            other => panic!("unexpected status {}: {}", other, body),
        }
    }
    assert_eq!(created, 1);

    let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE phone = $1")
        .bind(&phone)
        .fetch_one(&h.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn sessions_follow_the_stored_user() {
    let Some(h) = harness().await else { return };
    let admin = h.user("Root", Role::Admin).await;
    let worker = h.user("Ivy", Role::Employee).await;
    let demoted = h.user("Jack", Role::Admin).await;
    let worker_cookie = h.cookie(&worker);
    let demoted_cookie = h.cookie(&demoted);

    let (status, _, _) = h.send("GET", "/api/leads", Some(&worker_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = h.send("GET", "/api/users", Some(&demoted_cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = h
        .send(
            "PATCH",
            &format!("/api/users/{}/deactivate", worker.id),
            Some(&h.cookie(&admin)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    for uri in ["/api/leads", "/api/dashboard", "/api/auth/validate-token"] {
        let (status, _, body) = h.send("GET", uri, Some(&worker_cookie), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["message"], "Unauthorized");
    }

    sqlx::query("UPDATE users SET role = 'EMPLOYEE' WHERE id = $1")
        .bind(demoted.id)
        .execute(&h.pool)
        .await
        .unwrap();
    let (status, _, _) = h.send("GET", "/api/users", Some(&demoted_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, body) = h
        .send("GET", "/api/auth/validate-token", Some(&demoted_cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "EMPLOYEE");

    let ghost = encode_token(&Claims::new(i32::MAX, Role::Admin, 1), SECRET).unwrap();
    let (status, _, _) = h
        .send(
            "GET",
            "/api/leads",
            Some(&format!("auth_token={}", ghost)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_users_and_courses_are_kept() {
    let Some(h) = harness().await else { return };
    let admin = h.user("Kim", Role::Admin).await;
    let cookie = h.cookie(&admin);

    let (status, _, body) = h
        .send(
            "POST",
            "/api/users",
            Some(&cookie),
            Some(json!({
                "firstName": "Liam",
                "lastName": h.tag,
                "email": format!("liam.{}@example.com", h.tag),
                "password": "secret99",
                "phone": random_phone(),
                "role": "EMPLOYEE",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let user_id = body["user"]["id"].as_i64().unwrap();

    let (status, _, body) = h
        .send(
            "POST",
            "/api/courses",
            Some(&cookie),
            Some(json!({ "name": format!("Data Science {}", h.tag), "level": "MASTERS" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let course_id = body["course"]["id"].as_i64().unwrap();

    for (path, key) in [
        (format!("/api/users/{}", user_id), "user"),
        (format!("/api/courses/{}", course_id), "course"),
    ] {
        let (status, _, body) = h
            .send("PATCH", &format!("{}/deactivate", path), Some(&cookie), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body[key]["isActive"], false);

        let (status, _, body) = h.send("GET", &path, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body[key]["id"], if key == "user" { user_id } else { course_id });
        assert_eq!(body[key]["isActive"], false);
    }

    let (_, _, body) = h
        .send("GET", "/api/courses/levels?level=MASTERS", Some(&cookie), None)
        .await;
    assert!(body["courses"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"] != course_id));
}

#[tokio::test]
async fn employees_are_kept_out_of_admin_routes() {
    let Some(h) = harness().await else { return };
    let employee = h.user("Mona", Role::Employee).await;
    let cookie = h.cookie(&employee);

    for uri in ["/api/users", "/api/users/1", "/api/courses", "/api/courses/3"] {
        let (status, _, body) = h.send("GET", uri, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(
            body["message"],
            "You do not have permission to perform this action"
        );
    }

    let (status, _, _) = h
        .send(
            "PATCH",
            "/api/leads/1/assigned",
            Some(&cookie),
            Some(json!({ "assignedTo": employee.id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_filter_values_are_rejected() {
    let Some(h) = harness().await else { return };
    let employee = h.user("Nora", Role::Employee).await;
    let cookie = h.cookie(&employee);

    let (status, _, body) = h
        .send("GET", "/api/leads?status=WON", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid lead status: WON");

    let (status, _, _) = h
        .send("GET", "/api/follow-ups?completed=maybe", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = h
        .send("GET", "/api/courses/levels", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Course level is required");
}
