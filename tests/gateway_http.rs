//! SoapGateway over real HTTP: a one-shot listener on an ephemeral loopback
//! port answers a single call, so the status-handling branches and the wire
//! format get exercised without a deployment.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use paleo_download::soap::transport::SoapTransport;
use paleo_download::{PaleoError, Payload, RemoteCall, ServiceDescription, SoapGateway, Value};

const WSDL: &str = r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
                                   targetNamespace="http://tempuri.org/">
  <portType name="IPaleoService">
    <operation name="Ping"/>
  </portType>
  <binding name="BasicHttpBinding_IPaleoService" type="tns:IPaleoService">
    <operation name="Ping">
      <operation soapAction="http://tempuri.org/IPaleoService/Ping"/>
    </operation>
  </binding>
</definitions>"#;

/// Serve exactly one HTTP exchange. The captured request text comes back
/// through the join handle so tests can assert on headers and body.
fn serve_once(status_line: &str, body: &str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("local address");
    let response = format!(
        "{status_line}\r\ncontent-type: text/xml; charset=utf-8\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let request = read_request(&mut stream);
        stream
            .write_all(response.as_bytes())
            .expect("write response");
        request
    });
    (format!("http://{addr}/PaleoWebService2.svc"), handle)
}

/// Read one request: headers up to the blank line, then content-length
/// bytes of body.
fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).expect("read request");
        assert!(n > 0, "connection closed before the request completed");
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let content_length = String::from_utf8_lossy(&buffer[..header_end])
        .to_lowercase()
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buffer.len() < header_end + content_length {
        let n = stream.read(&mut chunk).expect("read request body");
        assert!(n > 0, "connection closed mid-body");
        buffer.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn gateway_for(endpoint: String) -> SoapGateway {
    let description = ServiceDescription::parse(WSDL).expect("service description");
    let transport =
        SoapTransport::new(Duration::from_secs(5), "mario", "segreto").expect("transport");
    SoapGateway::new(transport, endpoint, description)
}

#[test]
fn fault_details_are_mined_out_of_http_500_bodies() {
    let fault = concat!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>"#,
        r#"<s:Fault><faultcode>s:Client</faultcode>"#,
        r#"<faultstring>Credenziali non valide</faultstring></s:Fault>"#,
        r#"</s:Body></s:Envelope>"#,
    );
    let (endpoint, server) = serve_once("HTTP/1.1 500 Internal Server Error", fault);

    let err = gateway_for(endpoint)
        .invoke("Ping", &Payload::new())
        .expect_err("fault response");
    server.join().expect("server thread");

    match err {
        PaleoError::Fault { code, message } => {
            assert_eq!(code, "s:Client");
            assert_eq!(message, "Credenziali non valide");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn http_errors_without_a_fault_keep_status_and_body_snippet() {
    let (endpoint, server) = serve_once("HTTP/1.1 502 Bad Gateway", "upstream connect error");

    let err = gateway_for(endpoint)
        .invoke("Ping", &Payload::new())
        .expect_err("transport failure");
    server.join().expect("server thread");

    match err {
        PaleoError::Transport(source) => {
            let message = source.to_string();
            assert!(message.contains("502"), "{message}");
            assert!(message.contains("upstream connect error"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn successful_calls_carry_soap_headers_and_unwrap_the_result() {
    let response = concat!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>"#,
        r#"<PingResponse xmlns="http://tempuri.org/"><PingResult>pong</PingResult></PingResponse>"#,
        r#"</s:Body></s:Envelope>"#,
    );
    let (endpoint, server) = serve_once("HTTP/1.1 200 OK", response);

    let mut payload = Payload::new();
    payload.insert("codice_aoo".to_string(), Value::from("AOO1"));
    let value = gateway_for(endpoint)
        .invoke("Ping", &payload)
        .expect("successful call");
    let request = server.join().expect("server thread");

    assert_eq!(value, Some(Value::from("pong")));
    assert!(request.starts_with("POST /PaleoWebService2.svc"), "{request}");
    assert!(
        request.contains(r#"soapaction: "http://tempuri.org/IPaleoService/Ping""#),
        "{request}"
    );
    assert!(
        request.contains("content-type: text/xml; charset=utf-8"),
        "{request}"
    );
    assert!(request.contains("authorization: Basic "), "{request}");
    assert!(
        request.contains(r#"<Ping xmlns="http://tempuri.org/"><codice_aoo>AOO1</codice_aoo></Ping>"#),
        "{request}"
    );
}
