//! OAuth1 handshake and signed calls against a mocked third party.

mod support;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bridgekit_core::{AuthorizationPayload, AuthorizedIntegration};
use bridgekit_domain::constants::OAUTH1_COMPONENT;
use bridgekit_domain::{format_error_message, AuthorizationError, HttpMethod, OAuth1Error, OAuth1Settings};
use bridgekit_infra::oauth1::params::parse_authorization_header;
use bridgekit_infra::oauth1::OAuthParameters;
use bridgekit_infra::{OAuth1AuthorizedIntegration, OAuth1Provider, OAuthRsaSignerFactory};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha1::Sha1;
use support::OAUTH1_PRIVATE_KEY;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> OAuth1Settings {
    OAuth1Settings {
        consumer_key: "OauthKey".into(),
        private_key: OAUTH1_PRIVATE_KEY.into(),
        request_temporary_token_url: format!("{}/reqTempToken", server.uri()),
        authorization_callback_url: format!("{}/myCallback", server.uri()),
        authorize_temporary_token_url: format!("{}/authTempToken", server.uri()),
        request_access_token_url: format!("{}/reqAccessToken", server.uri()),
    }
}

fn provider(server: &MockServer) -> OAuth1Provider {
    OAuth1Provider::with_default_transport(&settings(server), &OAuthRsaSignerFactory::new()).unwrap()
}

async fn mount_token_endpoints(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/reqTempToken"))
        .and(header_exists("Authorization"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=token123&oauth_token_secret=secret&oauth_callback_confirmed=true"),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/reqAccessToken"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=access456&oauth_token_secret=s"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn three_legged_handshake_round_trip() {
    let server = MockServer::start().await;
    mount_token_endpoints(&server).await;
    let provider = provider(&server);

    let temporary = provider.request_temporary_token().await.unwrap();
    assert_eq!(temporary, "token123");

    let url = provider.request_authorization_url(&temporary).unwrap();
    assert_eq!(url, format!("{}/authTempToken?oauth_token=token123", server.uri()));

    let access = provider.request_access_token(&temporary, "verifier").await.unwrap();
    assert_eq!(access, "access456");
}

#[tokio::test]
async fn signed_request_verifies_with_public_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"alice"}"#))
        .mount(&server)
        .await;
    let provider = provider(&server);
    let request_url = format!("{}/rest/api/2/myself?expand=groups", server.uri());

    let response = provider
        .make_authorized_request("access456", &request_url, HttpMethod::Get, None)
        .await
        .unwrap();
    assert_eq!(response.text(), r#"{"name":"alice"}"#);

    let received = server.received_requests().await.unwrap();
    let header = received[0].headers.get("Authorization").unwrap().to_str().unwrap().to_string();
    let fields = parse_authorization_header(&header).unwrap();
    let field = |name: &str| {
        fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()).unwrap()
    };

    assert_eq!(field("oauth_token"), "access456");
    assert_eq!(field("oauth_signature_method"), "RSA-SHA1");

    let params = OAuthParameters::with_nonce(
        &field("oauth_consumer_key"),
        &field("oauth_nonce"),
        field("oauth_timestamp").parse().unwrap(),
    )
    .with("oauth_token", &field("oauth_token"));
    let base_string = params.base_string(HttpMethod::Get, &request_url).unwrap();

    let signer = OAuthRsaSignerFactory::new().signer(OAUTH1_PRIVATE_KEY).unwrap();
    let signature_bytes = STANDARD.decode(field("oauth_signature")).unwrap();
    let signature = Signature::try_from(signature_bytes.as_slice()).unwrap();
    VerifyingKey::<Sha1>::new(signer.public_key().clone())
        .verify(base_string.as_bytes(), &signature)
        .unwrap();
}

#[tokio::test]
async fn invalid_parameters_keep_status_and_formatted_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid parameters"))
        .mount(&server)
        .await;
    let provider = provider(&server);

    let err = provider
        .make_authorized_request("token123", &server.uri(), HttpMethod::Get, None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(400));
    assert!(matches!(err, OAuth1Error::HttpRequest { .. }));
    assert_eq!(err.to_string(), format_error_message(OAUTH1_COMPONENT, "Invalid parameters"));
}

#[tokio::test]
async fn integration_grants_and_uses_access_token() {
    let server = MockServer::start().await;
    mount_token_endpoints(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"key":"BK-1"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let integration = OAuth1AuthorizedIntegration::new("jira");
    integration.register_provider(server.uri(), Arc::new(provider(&server)));

    let authorization_url = integration.get_authorization_url(&server.uri(), 42).await.unwrap();
    assert!(authorization_url.ends_with("/authTempToken?oauth_token=token123"));

    integration
        .authorize(AuthorizationPayload::from_parameters([
            ("oauth_token", "token123"),
            ("oauth_verifier", "verifier"),
        ]))
        .await
        .unwrap();
    assert!(integration.is_user_authorized(&server.uri(), 42));

    let response = integration
        .authorized_request(
            &server.uri(),
            42,
            HttpMethod::Post,
            &format!("{}/rest/api/2/issue", server.uri()),
            Some(r#"{"fields":{}}"#.to_string()),
        )
        .await
        .unwrap();
    assert_eq!(response.status, 201);

    let err = integration
        .authorized_request(&server.uri(), 7, HttpMethod::Get, &server.uri(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthorizationError::UserNotAuthorized { user_id: 7, .. }));
}
