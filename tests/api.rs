//! End-to-end tests driving the HTTP API over a real socket.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use hrms::{config::Config, create_app};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

struct TestServer {
    base: String,
    client: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::with_data_dir(dir.path().to_string_lossy().to_string());
        let app = create_app(config).await.expect("app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.expect("serve");
        });

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.expect("request");
        let status = response.status();
        (status, response.json().await.expect("json body"))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self.client.post(self.url(path)).json(&body).send().await.expect("request");
        let status = response.status();
        (status, response.json().await.expect("json body"))
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self.client.put(self.url(path)).json(&body).send().await.expect("request");
        let status = response.status();
        (status, response.json().await.expect("json body"))
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.delete(self.url(path)).send().await.expect("request");
        let status = response.status();
        (status, response.json().await.expect("json body"))
    }

    async fn seed_employee(&self, id: &str, first: &str, last: &str) {
        let (status, _) = self
            .post(
                "/api/employees",
                json!({
                    "employeeId": id,
                    "firstName": first,
                    "lastName": last,
                    "companyEmail": format!("{}@example.com", first.to_lowercase()),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn seed_staff(&self) {
        self.seed_employee("E1", "Alex", "Johnson").await;
        self.seed_employee("E2", "Sarah", "Lee").await;
        self.seed_employee("E3", "David", "Chen").await;
        self.seed_employee("E4", "Emma", "Davis").await;
    }

    async fn create_payroll_project(&self) -> String {
        let (status, body) = self
            .post(
                "/api/projects",
                json!({
                    "name": "Payroll Revamp",
                    "key": "PAY",
                    "type": "Software",
                    "projectLead": "Alex Johnson",
                    "projectManagers": ["Sarah Lee"],
                    "technicalLeads": ["David Chen"],
                    "teamMembers": ["Emma Davis"],
                    "startDate": "2024-01-01",
                    "endDate": "2024-06-30",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["project_id"].as_str().unwrap().to_string()
    }
}

fn roles_of(project: &Value) -> Vec<(String, String)> {
    let mut roles: Vec<(String, String)> = project["team_members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["employee_id"].as_str().unwrap().to_string(),
                m["role"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    roles.sort();
    roles
}

#[tokio::test]
async fn health_check_responds_ok() {
    let server = TestServer::start().await;
    let response = reqwest::get(server.url("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn create_project_assigns_every_role() {
    let server = TestServer::start().await;
    server.seed_staff().await;

    let project_id = server.create_payroll_project().await;

    let (status, body) = server.get(&format!("/api/projects/{}", project_id)).await;
    assert_eq!(status, StatusCode::OK);
    let project = &body["data"];
    assert_eq!(project["key"], "PAY");
    assert_eq!(project["status"], "Active");
    assert_eq!(project["lead_id"], "E1");
    assert_eq!(project["projectLead"]["first_name"], "Alex");
    assert_eq!(project["projectManagers"][0]["employee_id"], "E2");
    assert_eq!(project["technicalLeads"][0]["employee_id"], "E3");
    assert_eq!(
        roles_of(project),
        vec![
            ("E1".to_string(), "Lead".to_string()),
            ("E2".to_string(), "Project Manager".to_string()),
            ("E3".to_string(), "Technical Lead".to_string()),
            ("E4".to_string(), "Member".to_string()),
        ]
    );

    let (status, body) = server.get("/api/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_team_member_rolls_back_creation() {
    let server = TestServer::start().await;
    server.seed_staff().await;

    let (status, body) = server
        .post(
            "/api/projects",
            json!({
                "name": "Ghost Project",
                "key": "GHOST",
                "type": "Software",
                "projectLead": "Alex Johnson",
                "projectManagers": ["Sarah Lee"],
                "teamMembers": ["Nobody Here"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Nobody Here"));

    let (_, body) = server.get("/api/projects").await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn create_project_validates_input() {
    let server = TestServer::start().await;
    server.seed_staff().await;

    let (status, body) = server
        .post("/api/projects", json!({ "key": "PAY", "type": "Software", "projectLead": "Alex Johnson" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Project name is required");

    let (status, _) = server
        .post(
            "/api/projects",
            json!({ "name": "X", "key": "PAY", "type": "Software", "projectLead": "Nobody" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = server
        .client
        .post(server.url("/api/projects"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_project_key_conflicts() {
    let server = TestServer::start().await;
    server.seed_staff().await;
    server.create_payroll_project().await;

    let (status, body) = server
        .post(
            "/api/projects",
            json!({ "name": "Again", "key": "PAY", "type": "Software", "projectLead": "Alex Johnson" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_project_is_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/projects/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let (status, _) = server.delete("/api/projects/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.put("/api/projects/does-not-exist", json!({ "name": "X" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_replaces_lead_and_team() {
    let server = TestServer::start().await;
    server.seed_staff().await;
    let project_id = server.create_payroll_project().await;

    let (status, body) = server
        .put(
            &format!("/api/projects/{}", project_id),
            json!({
                "name": "Payroll 2.0",
                "status": "On Hold",
                "projectLead": "Sarah Lee",
                "projectManagers": [],
                "technicalLeads": ["David Chen"],
                "teamMembers": ["Alex Johnson"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Payroll 2.0");

    let (_, body) = server.get(&format!("/api/projects/{}", project_id)).await;
    let project = &body["data"];
    assert_eq!(project["status"], "On Hold");
    assert_eq!(project["lead_id"], "E2");
    assert_eq!(
        roles_of(project),
        vec![
            ("E1".to_string(), "Member".to_string()),
            ("E2".to_string(), "Lead".to_string()),
            ("E3".to_string(), "Technical Lead".to_string()),
        ]
    );
}

#[tokio::test]
async fn failed_update_leaves_project_untouched() {
    let server = TestServer::start().await;
    server.seed_staff().await;
    let project_id = server.create_payroll_project().await;

    let (status, _) = server
        .put(
            &format!("/api/projects/{}", project_id),
            json!({ "name": "Renamed", "teamMembers": ["Nobody Here"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server.get(&format!("/api/projects/{}", project_id)).await;
    assert_eq!(body["data"]["name"], "Payroll Revamp");
    assert_eq!(roles_of(&body["data"]).len(), 4);
}

#[tokio::test]
async fn members_can_be_added_and_removed() {
    let server = TestServer::start().await;
    server.seed_staff().await;
    server.seed_employee("E5", "Liam", "Brown").await;
    let project_id = server.create_payroll_project().await;

    let (status, body) = server
        .post(
            "/api/projects/members",
            json!({ "projectId": project_id, "employeeId": "E5", "role": "Member" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["role"], "Member");

    let (status, _) = server
        .post(
            "/api/projects/members",
            json!({ "projectId": project_id, "employeeId": "E5" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post(
            "/api/projects/members",
            json!({ "projectId": project_id, "employeeId": "NOPE" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .delete(&format!("/api/projects/{}/members/E5", project_id))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .delete(&format!("/api/projects/{}/members/E5", project_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .delete(&format!("/api/projects/{}/members/E1", project_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_project_removes_its_team() {
    let server = TestServer::start().await;
    server.seed_staff().await;
    let project_id = server.create_payroll_project().await;
    let (status, _) = server
        .post("/api/tasks", json!({ "title": "Migrate payslips", "projectId": project_id }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.delete(&format!("/api/projects/{}", project_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");

    let (status, _) = server.get(&format!("/api/projects/{}", project_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Tasks outlive their project
    let (status, body) = server.get("/api/tasks/TASK-001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["projectId"], Value::Null);

    // The key is free again
    server.create_payroll_project().await;
}

#[tokio::test]
async fn selection_lists_active_employees() {
    let server = TestServer::start().await;
    server.seed_employee("E1", "Alex", "Johnson").await;
    let (status, _) = server
        .post(
            "/api/employees",
            json!({ "employeeId": "E9", "firstName": "Old", "lastName": "Timer", "employmentStatus": "Inactive" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.get("/api/projects/employees/selection").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(
        body["data"],
        json!([{
            "id": "E1",
            "name": "Alex Johnson",
            "email": "alex@example.com",
            "avatar": "/api/placeholder/40/40",
        }])
    );
}

#[tokio::test]
async fn employees_are_listed_and_fetched() {
    let server = TestServer::start().await;
    server.seed_employee("E1", "Alex", "Johnson").await;

    let (status, body) = server.get("/api/employees/E1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["firstName"], "Alex");

    let (status, _) = server.get("/api/employees/E404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .post("/api/employees", json!({ "employeeId": "E1", "firstName": "Again" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = server.get("/api/employees").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn task_lifecycle() {
    let server = TestServer::start().await;
    server.seed_staff().await;
    let project_id = server.create_payroll_project().await;

    let (status, body) = server
        .post(
            "/api/tasks",
            json!({
                "title": "Fix login redirect",
                "type": "Bug",
                "priority": "High",
                "assignee": "Sarah Lee",
                "projectId": project_id,
                "dueDate": "2024-03-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["id"], "BUG-001");
    assert_eq!(body["data"]["status"], "To Do");

    let (status, body) = server
        .post("/api/tasks", json!({ "title": "Second bug", "type": "Bug" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "BUG-002");

    let (status, body) = server
        .post("/api/tasks", json!({ "title": "Write payslip story", "type": "Story", "assignee": "Sarah Lee" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "STOR-001");

    let (status, body) = server
        .put("/api/tasks/BUG-001", json!({ "status": "In Progress" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "In Progress");
    assert_eq!(body["data"]["dueDate"], "2024-03-01");

    let (_, body) = server.put("/api/tasks/BUG-002", json!({ "dueDate": "2024-04-01" })).await;
    assert_eq!(body["data"]["dueDate"], "2024-04-01");
    let (_, body) = server.put("/api/tasks/BUG-002", json!({ "dueDate": null })).await;
    assert_eq!(body["data"]["dueDate"], Value::Null);

    let (status, body) = server
        .post("/api/tasks/BUG-001/comments", json!({ "text": "Looking into it", "author": "Sarah Lee" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["author"], "Sarah Lee");

    let (_, body) = server.get("/api/tasks/BUG-001").await;
    assert_eq!(body["data"]["comments"][0]["text"], "Looking into it");
    assert_eq!(body["data"]["projectId"], project_id.as_str());

    let (_, body) = server.get("/api/tasks?assignee=Sarah%20Lee&sort=id").await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["BUG-001", "STOR-001"]);

    let (_, body) = server.get("/api/tasks?search=payslip&status=All").await;
    assert_eq!(body["count"], 1);

    let (status, _) = server.get("/api/tasks?status=Blocked").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server.get("/api/tasks/summary").await;
    assert_eq!(
        body["data"],
        json!({ "total": 3, "todo": 2, "inProgress": 1, "done": 0 })
    );

    let (_, body) = server.get("/api/tasks/summary?assignee=Sarah%20Lee").await;
    assert_eq!(body["data"]["total"], 2);

    let (status, _) = server.delete("/api/tasks/BUG-002").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get("/api/tasks/BUG-002").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_with_unknown_project_is_rejected() {
    let server = TestServer::start().await;

    let (status, _) = server
        .post("/api/tasks", json!({ "title": "Orphan", "projectId": "missing" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.post("/api/tasks", json!({ "title": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Task title is required");

    let (status, _) = server
        .post("/api/tasks/TASK-404/comments", json!({ "text": "hello" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
