//! Request shape and result handling for every operation

mod common;

use anyhow::Result;
use common::{GUID, MockTransport, SERVICE_URL, client, json_response};
use reqwest::Method;
use serde_json::json;
use xrm_webapi::api::{EntityReference, HttpResponse, WebApiError};

#[tokio::test]
async fn test_retrieve() -> Result<()> {
    common::init_logging();
    let transport = MockTransport::new().respond(json_response(200, json!({"accountid": GUID, "name": "Contoso"})));

    let record = client(&transport).retrieve("accounts", &format!("{{{}}}", GUID)).await?;
    assert_eq!(record["name"], "Contoso");

    let request = transport.last_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url.as_str(), format!("{}accounts({})", SERVICE_URL, GUID));
    assert!(!request.url.as_str().contains('{'));
    assert!(!request.url.as_str().contains("%7B"));
    assert_eq!(request.header("Prefer"), Some("odata.include-annotations=\"*\""));
    assert_eq!(request.body, "");
    Ok(())
}

#[tokio::test]
async fn test_standard_headers_on_every_request() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204));
    client(&transport).delete("accounts", GUID).await?;

    let request = transport.last_request();
    assert_eq!(
        request.headers,
        vec![
            ("OData-MaxVersion".to_string(), "4.0".to_string()),
            ("OData-Version".to_string(), "4.0".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json; charset=utf-8".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_retrieve_multiple_returns_value_array() -> Result<()> {
    let transport = MockTransport::new().respond(json_response(
        200,
        json!({
            "@odata.context": "https://org.crm.dynamics.com/api/data/v8.2/$metadata#accounts(name)",
            "value": [{"name": "A"}, {"name": "B"}]
        }),
    ));

    let records = client(&transport).retrieve_multiple("accounts?$select=name").await?;
    assert_eq!(records, vec![json!({"name": "A"}), json!({"name": "B"})]);

    let request = transport.last_request();
    assert_eq!(request.url.as_str(), format!("{}accounts?$select=name", SERVICE_URL));
    assert_eq!(
        request.header("Prefer"),
        Some("odata.include-annotations=\"*\",odata.maxpagesize=5000")
    );
    Ok(())
}

#[tokio::test]
async fn test_retrieve_multiple_page_size_override() -> Result<()> {
    let transport = MockTransport::new().respond(json_response(200, json!({"value": []})));

    let records = client(&transport)
        .retrieve_multiple_with_page_size("contacts", 25)
        .await?;
    assert!(records.is_empty());
    assert_eq!(
        transport.last_request().header("Prefer"),
        Some("odata.include-annotations=\"*\",odata.maxpagesize=25")
    );
    Ok(())
}

#[tokio::test]
async fn test_retrieve_multiple_zero_page_size_uses_default() -> Result<()> {
    let transport = MockTransport::new().respond(json_response(200, json!({"value": []})));

    client(&transport).retrieve_multiple_with_page_size("accounts", 0).await?;
    assert_eq!(
        transport.last_request().header("Prefer"),
        Some("odata.include-annotations=\"*\",odata.maxpagesize=5000")
    );
    Ok(())
}

#[tokio::test]
async fn test_retrieve_multiple_without_value_array() {
    let transport = MockTransport::new().respond(json_response(200, json!({"name": "not a list"})));

    let result = client(&transport).retrieve_multiple("accounts").await;
    assert!(matches!(result, Err(WebApiError::UnexpectedPayload(_))));
}

#[tokio::test]
async fn test_create_returns_id_from_header() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204).with_header(
        "OData-EntityId",
        format!("https://org/api/data/v8.2/accounts({})", GUID),
    ));

    let id = client(&transport).create("accounts", json!({"name": "Contoso"})).await?;
    assert_eq!(id, GUID);

    let request = transport.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url.as_str(), format!("{}accounts", SERVICE_URL));
    assert_eq!(request.body, r#"{"name":"Contoso"}"#);
    assert_eq!(request.header("Prefer"), None);
    Ok(())
}

#[tokio::test]
async fn test_create_without_entity_id_header() {
    let transport = MockTransport::new().respond(HttpResponse::new(204));

    let result = client(&transport).create("accounts", json!({})).await;
    assert!(matches!(result, Err(WebApiError::MissingEntityId)));
}

#[tokio::test]
async fn test_create_rejects_201() {
    let transport = MockTransport::new().respond(json_response(201, json!({"accountid": GUID})).with_status_text("Created"));

    let result = client(&transport).create("accounts", json!({})).await;
    assert!(matches!(result, Err(WebApiError::HttpFailure { status: 201, .. })));
}

#[tokio::test]
async fn test_create_and_select() -> Result<()> {
    let transport = MockTransport::new()
        .respond(json_response(201, json!({"contactid": GUID, "createdon": "2017-01-01T00:00:00Z"})))
        .respond(json_response(201, json!({"contactid": GUID, "fullname": "Jane Doe"})));
    let client = client(&transport);

    let created = client.create_and_select("contacts", json!({"lastname": "Doe"}), None).await?;
    assert_eq!(created["createdon"], "2017-01-01T00:00:00Z");
    let request = transport.last_request();
    assert_eq!(request.url.as_str(), format!("{}contacts?$select=createdon", SERVICE_URL));
    assert_eq!(request.header("Prefer"), Some("return=representation"));

    let selected = client
        .create_and_select("contacts", json!({"lastname": "Doe"}), Some("$select=fullname"))
        .await?;
    assert_eq!(selected["fullname"], "Jane Doe");
    assert_eq!(
        transport.last_request().url.as_str(),
        format!("{}contacts?$select=fullname", SERVICE_URL)
    );
    Ok(())
}

#[tokio::test]
async fn test_update() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204));

    client(&transport)
        .update("accounts", &format!("{{{}}}", GUID), json!({"name": "Renamed"}))
        .await?;

    let request = transport.last_request();
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.url.as_str(), format!("{}accounts({})", SERVICE_URL, GUID));
    assert_eq!(request.body, r#"{"name":"Renamed"}"#);
    Ok(())
}

#[tokio::test]
async fn test_delete_accepts_204_and_1223() -> Result<()> {
    let transport = MockTransport::new()
        .respond(HttpResponse::new(204))
        .respond(HttpResponse::new(1223));
    let client = client(&transport);

    client.delete("accounts", GUID).await?;
    client.delete("accounts", GUID).await?;

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.method == Method::DELETE));
    Ok(())
}

#[tokio::test]
async fn test_delete_rejects_200() {
    let transport = MockTransport::new().respond(HttpResponse::new(200).with_status_text("OK"));

    let result = client(&transport).delete("accounts", GUID).await;
    assert!(matches!(result, Err(WebApiError::HttpFailure { status: 200, .. })));
}

#[tokio::test]
async fn test_associate() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204));

    client(&transport)
        .associate(
            EntityReference::new("accounts", format!("{{{}}}", GUID)),
            "contact_customer_accounts",
            EntityReference::new("contacts", "22222222-2222-2222-2222-222222222222"),
        )
        .await?;

    let request = transport.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.url.as_str(),
        format!("{}accounts({})/contact_customer_accounts/$ref", SERVICE_URL, GUID)
    );
    let body: serde_json::Value = serde_json::from_str(&request.body)?;
    assert_eq!(
        body["@odata.id"],
        format!("{}contacts(22222222-2222-2222-2222-222222222222)", SERVICE_URL)
    );
    Ok(())
}

#[tokio::test]
async fn test_disassociate() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(1223));

    client(&transport)
        .disassociate(
            EntityReference::new("accounts", GUID),
            "contact_customer_accounts",
            "{22222222-2222-2222-2222-222222222222}",
        )
        .await?;

    let request = transport.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        request.url.as_str(),
        format!(
            "{}accounts({})/contact_customer_accounts(22222222-2222-2222-2222-222222222222)/$ref",
            SERVICE_URL, GUID
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_disassociate_lookup() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204));

    client(&transport)
        .disassociate_lookup(EntityReference::new("contacts", GUID), "parentcustomerid_account")
        .await?;

    assert_eq!(
        transport.last_request().url.as_str(),
        format!("{}contacts({})/parentcustomerid_account/$ref", SERVICE_URL, GUID)
    );
    Ok(())
}

#[tokio::test]
async fn test_call_unbound_action() -> Result<()> {
    let transport = MockTransport::new().respond(json_response(200, json!({"UserId": GUID})));

    let result = client(&transport).call_unbound_action("WhoAmI", None).await?;
    assert_eq!(result, Some(json!({"UserId": GUID})));

    let request = transport.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url.as_str(), format!("{}WhoAmI", SERVICE_URL));
    assert_eq!(request.body, "");
    Ok(())
}

#[tokio::test]
async fn test_call_unbound_action_with_empty_body() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(200));

    let result = client(&transport)
        .call_unbound_action("new_Recalculate", Some(json!({"Force": true})))
        .await?;
    assert_eq!(result, None);
    assert_eq!(transport.last_request().body, r#"{"Force":true}"#);
    Ok(())
}

#[tokio::test]
async fn test_call_unbound_action_no_content() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204));

    let result = client(&transport).call_unbound_action("WhoAmI", None).await?;
    assert_eq!(result, None);
    Ok(())
}

#[tokio::test]
async fn test_call_bound_action_with_result() -> Result<()> {
    let transport = MockTransport::new().respond(json_response(200, json!({"Total": 42})));

    let result = client(&transport)
        .call_bound_action("opportunities", &format!("{{{}}}", GUID), "Microsoft.Dynamics.CRM.CalculateTotal", None)
        .await?;
    assert_eq!(result, Some(json!({"Total": 42})));
    assert_eq!(
        transport.last_request().url.as_str(),
        format!("{}opportunities({})/Microsoft.Dynamics.CRM.CalculateTotal", SERVICE_URL, GUID)
    );
    Ok(())
}

#[tokio::test]
async fn test_call_bound_action_no_content() -> Result<()> {
    let transport = MockTransport::new().respond(HttpResponse::new(204));

    let result = client(&transport)
        .call_bound_action("accounts", GUID, "new_Touch", Some(json!({"Reason": "test"})))
        .await?;
    assert_eq!(result, None);
    assert_eq!(transport.last_request().body, r#"{"Reason":"test"}"#);
    Ok(())
}

#[tokio::test]
async fn test_success_body_that_is_not_json() {
    let transport = MockTransport::new().respond(HttpResponse::new(200).with_body("<html>proxy</html>"));

    let result = client(&transport).retrieve("accounts", GUID).await;
    assert!(matches!(result, Err(WebApiError::BodyParse(_))));
}

#[tokio::test]
async fn test_extra_braces_are_not_fully_stripped() -> Result<()> {
    let transport = MockTransport::new().respond(json_response(200, json!({})));

    client(&transport).retrieve("accounts", "{a}{b}").await?;
    assert_eq!(
        transport.last_request().url.as_str(),
        format!("{}accounts(a%7Bb%7D)", SERVICE_URL)
    );
    Ok(())
}
