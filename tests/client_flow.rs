//! Full client flow over a fake gateway: connect-time schema snapshots
//! drive payload construction, responses come back through the extractors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use paleo_download::{
    DocumentReference, LogicalField, OperationSchema, PaleoClient, PaleoConfig, PaleoError,
    ParameterElement, Payload, Purpose, RemoteCall, ResolvedOperation, Value, ValueMap,
};
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct CallLog(Rc<RefCell<Vec<(String, Payload)>>>);

impl CallLog {
    fn recorded(&self) -> Vec<(String, Payload)> {
        self.0.borrow().clone()
    }
}

struct FakeGateway {
    log: CallLog,
    responses: HashMap<String, Value>,
}

impl RemoteCall for FakeGateway {
    fn invoke(&self, operation: &str, payload: &Payload) -> Result<Option<Value>, PaleoError> {
        self.log
            .0
            .borrow_mut()
            .push((operation.to_string(), payload.clone()));
        Ok(self.responses.get(operation).cloned())
    }
}

fn config() -> PaleoConfig {
    PaleoConfig {
        wsdl_url: "https://paleo.example.it/PaleoWebService2.svc?singleWsdl".to_string(),
        username: "mario".to_string(),
        password: "segreto".to_string(),
        org_code: "AOO1".to_string(),
        fascicolo_id: "F123".to_string(),
        output_dir: PathBuf::from("downloads"),
        timeout: Duration::from_secs(60),
        list_method: None,
        download_method: None,
        service_name: None,
        port_name: None,
    }
}

fn list_operation() -> ResolvedOperation {
    ResolvedOperation {
        name: "CercaDocumentiFascicolo2".to_string(),
        schema: OperationSchema::new(vec![
            ParameterElement::leaf("codiceAOO"),
            ParameterElement::leaf("idFascicolo"),
            ParameterElement::leaf("userName"),
            ParameterElement::leaf("password"),
        ]),
    }
}

fn download_operation() -> ResolvedOperation {
    ResolvedOperation {
        name: "ScaricaDocumento".to_string(),
        schema: OperationSchema::new(vec![ParameterElement::wrapper(
            "request",
            vec![
                ParameterElement::leaf("codiceAOO"),
                ParameterElement::leaf("idDocumento"),
                ParameterElement::leaf("userName"),
                ParameterElement::leaf("password"),
            ],
        )]),
    }
}

fn entry(pairs: &[(&str, &str)]) -> Value {
    let mut map = ValueMap::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), Value::from(*value));
    }
    Value::Map(map)
}

fn listing_response() -> Value {
    let mut wrapper = ValueMap::new();
    wrapper.insert(
        "Documenti".to_string(),
        Value::List(vec![
            entry(&[
                ("Id", "1"),
                ("NomeFile", "delibera.pdf"),
                ("MimeType", "application/pdf"),
            ]),
            entry(&[("Id", "2"), ("NomeFile", "allegato.pdf")]),
        ]),
    );
    Value::Map(wrapper)
}

fn client_with(
    responses: HashMap<String, Value>,
) -> (PaleoClient<FakeGateway>, CallLog) {
    let log = CallLog::default();
    let gateway = FakeGateway {
        log: log.clone(),
        responses,
    };
    let client = PaleoClient::from_parts(gateway, &config(), list_operation(), download_operation());
    (client, log)
}

fn keys(payload: &Payload) -> Vec<&str> {
    payload.keys().map(String::as_str).collect()
}

#[test]
fn listing_sends_schema_spelled_parameters_and_returns_references() {
    let responses = HashMap::from([("CercaDocumentiFascicolo2".to_string(), listing_response())]);
    let (client, log) = client_with(responses);

    let documents = client.list_documents().expect("listing");
    assert_eq!(
        documents,
        vec![
            DocumentReference {
                document_id: "1".to_string(),
                filename: "delibera.pdf".to_string(),
                mime_type: Some("application/pdf".to_string()),
            },
            DocumentReference {
                document_id: "2".to_string(),
                filename: "allegato.pdf".to_string(),
                mime_type: None,
            },
        ]
    );

    let calls = log.recorded();
    assert_eq!(calls.len(), 1);
    let (operation, payload) = &calls[0];
    assert_eq!(operation, "CercaDocumentiFascicolo2");
    assert_eq!(
        keys(payload),
        vec!["codiceAOO", "idFascicolo", "userName", "password"]
    );
    assert_eq!(payload["codiceAOO"], Value::from("AOO1"));
    assert_eq!(payload["idFascicolo"], Value::from("F123"));
}

#[test]
fn download_nests_the_selected_document_under_the_wrapper() {
    let responses = HashMap::from([
        ("CercaDocumentiFascicolo2".to_string(), listing_response()),
        // Base64 of "%PDF-1.4", the way a wrapped Result leaf arrives.
        ("ScaricaDocumento".to_string(), Value::from("JVBERi0xLjQ=")),
    ]);
    let (client, log) = client_with(responses);

    let documents = client.list_documents().expect("listing");
    let content = client
        .download_document(&documents[1])
        .expect("download");
    assert_eq!(content, b"%PDF-1.4");

    let calls = log.recorded();
    let (operation, payload) = &calls[1];
    assert_eq!(operation, "ScaricaDocumento");
    assert_eq!(keys(payload), vec!["request"]);
    let inner = payload["request"].as_map().expect("wrapper payload");
    assert_eq!(
        inner.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["codiceAOO", "idDocumento", "userName", "password"]
    );
    assert_eq!(inner["idDocumento"], Value::from("2"));
}

#[test]
fn empty_listing_response_yields_no_documents() {
    let (client, _log) = client_with(HashMap::new());
    let documents = client.list_documents().expect("listing");
    assert!(documents.is_empty());
}

#[test]
fn repeated_listings_send_identical_payloads() {
    let responses = HashMap::from([("CercaDocumentiFascicolo2".to_string(), listing_response())]);
    let (client, log) = client_with(responses);

    client.list_documents().expect("first listing");
    client.list_documents().expect("second listing");

    let calls = log.recorded();
    assert_eq!(calls[0].1, calls[1].1);
    assert_eq!(
        calls[0].1.iter().collect::<Vec<_>>(),
        calls[1].1.iter().collect::<Vec<_>>()
    );
}

#[test]
fn unmatchable_schema_fails_before_reaching_the_gateway() {
    let log = CallLog::default();
    let gateway = FakeGateway {
        log: log.clone(),
        responses: HashMap::new(),
    };
    let alien_list = ResolvedOperation {
        name: "CercaDocumentiFascicolo2".to_string(),
        schema: OperationSchema::new(vec![ParameterElement::leaf("tokenSessione")]),
    };
    let client = PaleoClient::from_parts(gateway, &config(), alien_list, download_operation());

    let err = client.list_documents().expect_err("nothing matches");
    match err {
        PaleoError::UnmatchedParameters {
            purpose,
            missing,
            declared,
        } => {
            assert_eq!(purpose, Purpose::ListDocuments);
            assert_eq!(missing, vec![LogicalField::CodiceAoo, LogicalField::FascicoloId]);
            assert_eq!(declared, vec!["tokenSessione".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(log.recorded().is_empty());
}

#[test]
fn download_of_empty_response_is_reported() {
    let responses = HashMap::from([("CercaDocumentiFascicolo2".to_string(), listing_response())]);
    let (client, _log) = client_with(responses);

    let documents = client.list_documents().expect("listing");
    let err = client
        .download_document(&documents[0])
        .expect_err("no download response configured");
    assert!(matches!(err, PaleoError::EmptyDownloadResponse));
}
