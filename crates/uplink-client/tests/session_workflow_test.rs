//! End-to-end session lifecycle against a mock control plane:
//! authenticate → create → finalize → poll status → delete.

use mockito::Matcher;
use uplink_client::ApiClient;

fn session_body(state: i32) -> String {
    format!(
        r#"{{"Id":"101","FolderId":"folder-9","SessionId":"corr-77","UploadTarget":"https://svc.example.com/videos/bucket123/prefix","State":{}}}"#,
        state
    )
}

#[tokio::test]
async fn full_session_lifecycle() {
    let mut server = mockito::Server::new_async().await;

    let token = server
        .mock("POST", "/oauth2/connect/token")
        .match_body(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"workflow-token"}"#)
        .create_async()
        .await;

    let create = server
        .mock("POST", "/PublicAPI/Rest/sessionUpload")
        .match_header("authorization", "Bearer workflow-token")
        .with_status(201)
        .with_body(session_body(0))
        .create_async()
        .await;

    let finish = server
        .mock("PUT", "/PublicAPI/Rest/sessionUpload/101")
        .match_header("authorization", "Bearer workflow-token")
        .match_body(Matcher::PartialJson(serde_json::json!({"State": 1})))
        .with_status(200)
        .with_body(session_body(1))
        .create_async()
        .await;

    // Remote processing finished: status reports a state this client never
    // writes itself.
    let status = server
        .mock("GET", "/PublicAPI/Rest/sessionUpload/101")
        .match_header("authorization", "Bearer workflow-token")
        .with_status(200)
        .with_body(session_body(4))
        .create_async()
        .await;

    let delete = server
        .mock("DELETE", "/api/v1/sessions/corr-77")
        .match_header("authorization", "Bearer workflow-token")
        .with_status(200)
        .create_async()
        .await;

    let mut client = ApiClient::new(server.url()).unwrap();
    client
        .authenticate("cid", "secret", "User@Example.com", "pw")
        .await
        .unwrap();

    let mut session = client.new_session("folder-9").await.unwrap();
    assert_eq!(session.state, 0);

    // Replace the local snapshot with each server response, as the control
    // plane is the source of truth.
    session = client.finish_session(&session).await.unwrap();
    assert_eq!(session.state, 1);

    let (refreshed, state) = client.session_status(&session).await.unwrap();
    session = refreshed;
    assert_eq!(state, 4);

    client.delete_session(&session.session_id).await.unwrap();

    token.assert_async().await;
    create.assert_async().await;
    finish.assert_async().await;
    status.assert_async().await;
    delete.assert_async().await;
}
