use chrono::{NaiveDate, NaiveDateTime};
use polar_flow_client::http_client::ReqwestFlowSession;
use polar_flow_client::{FlowClient, FlowError};
use secrecy::SecretString;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FlowClient {
    FlowClient::new(ReqwestFlowSession::new(&server.uri()).expect("session"))
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn activities_are_listed_for_the_window() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {"listItemId": 71760805, "url": "/training/analysis/71760805", "title": "Morning run", "calories": 640},
        {"listItemId": 71760900, "url": "/training/analysis/71760900", "title": "Commute"}
    ]);

    Mock::given(method("GET"))
        .and(path("/training/getCalendarEvents"))
        .and(query_param("start", "30.03.2015"))
        .and(query_param("end", "10.05.2015"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let acts = client
        .activities(Some(day(2015, 3, 30)), Some(day(2015, 5, 10)))
        .await
        .expect("activities");

    assert_eq!(acts.len(), 2);
    assert_eq!(acts[0].list_item_id(), "71760805");
    assert_eq!(acts[0].get("title").unwrap(), "Morning run");
    assert_eq!(acts[0].get("calories").unwrap(), 640);
    assert_eq!(acts[1].url(), Some("/training/analysis/71760900"));
    assert!(matches!(
        acts[1].get("calories"),
        Err(FlowError::AttributeNotFound(f)) if f == "calories"
    ));
}

#[tokio::test]
async fn default_window_ends_today_and_spans_thirty_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/training/getCalendarEvents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let before = chrono::Local::now().naive_local();
    let list = client.iter_activities(None, None).await.expect("list");
    assert!(list.is_empty());

    let received = server.received_requests().await.unwrap();
    let pairs: std::collections::HashMap<String, String> =
        received[0].url.query_pairs().into_owned().collect();
    let end = NaiveDate::parse_from_str(&pairs["end"], "%d.%m.%Y").expect("end date");
    let start = NaiveDate::parse_from_str(&pairs["start"], "%d.%m.%Y").expect("start date");
    // the clock may cross midnight between `before` and the request
    assert!(end == before.date() || end == before.date().succ_opt().unwrap());
    assert_eq!(end - start, chrono::Duration::days(30));
}

#[tokio::test]
async fn list_failure_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/training/getCalendarEvents"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client.activities(None, None).await;
    match res {
        Err(FlowError::Transport { url, status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
            assert!(url.ends_with("/training/getCalendarEvents"));
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_list_is_an_unexpected_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/training/getCalendarEvents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let res = client.iter_activities(None, None).await;
    match res {
        Err(FlowError::UnexpectedResponse { reason, .. }) => {
            assert!(reason.contains("<html>login</html>"));
        }
        other => panic!("expected UnexpectedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn session_cookie_is_sent_with_list_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajaxLogin"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "FLOWSESSID=xyz; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/training/getCalendarEvents"))
        .and(header("cookie", "FLOWSESSID=xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"listItemId": 1}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .login("runner@example.com", &SecretString::new("pw".into()))
        .await
        .expect("login");
    let acts = client.activities(None, None).await.expect("activities");
    assert_eq!(acts.len(), 1);
}
