use waypost::http::response::{ResponseBuilder, ResponseHead, StatusCode};
use waypost::http::writer::serialize_head;
use waypost::resolve::Decision;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Found.as_u16(), 302);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "Requested file has been found!");
    assert_eq!(
        StatusCode::Found.reason_phrase(),
        "Requested file has been moved to another server..."
    );
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Invalid request format.");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Requested file not found.");
    assert_eq!(StatusCode::InternalServerError.reason_phrase(), "SERVER ERROR!");
    assert_eq!(
        StatusCode::NotImplemented.reason_phrase(),
        "Unknown method provided."
    );
}

#[test]
fn test_status_code_from_u16() {
    for code in [200, 302, 400, 404, 500, 501] {
        assert_eq!(StatusCode::from_u16(code).unwrap().as_u16(), code);
    }
    assert_eq!(StatusCode::from_u16(418), None);
}

#[test]
fn test_ok_head_wire_format() {
    let head = ResponseHead::for_decision(&Decision::Found { size: 13 }, true, "waypost");

    assert_eq!(
        serialize_head(&head),
        b"HTTP/1.1 200 Requested file has been found!\r\n\
          Content-Type: application/octet-stream\r\n\
          Content-Length: 13\r\n\
          Server: waypost\r\n\
          \r\n"
            .to_vec()
    );
}

#[test]
fn test_redirect_head_wire_format() {
    let decision = Decision::Moved {
        location: "http://10.0.0.2:2567/a".to_string(),
    };
    let head = ResponseHead::for_decision(&decision, false, "waypost");

    assert_eq!(
        String::from_utf8(serialize_head(&head)).unwrap(),
        "HTTP/1.1 302 Requested file has been moved to another server...\r\n\
         Location: http://10.0.0.2:2567/a\r\n\
         Server: waypost\r\n\
         Connection: close\r\n\
         \r\n"
    );
}

#[test]
fn test_error_heads_have_no_entity_headers() {
    for decision in [
        Decision::NotFound,
        Decision::Rejected(StatusCode::BadRequest),
        Decision::Rejected(StatusCode::NotImplemented),
    ] {
        let head = ResponseHead::for_decision(&decision, false, "waypost");
        assert_eq!(head.status, decision.status());
        assert_eq!(head.header("Content-Type"), None);
        assert_eq!(head.header("Content-Length"), None);
        assert_eq!(head.header("Location"), None);
        assert_eq!(head.header("connection"), Some("close"));
    }
}

#[test]
fn test_builder_ignores_headers_for_other_statuses() {
    let head = ResponseBuilder::new(StatusCode::NotFound)
        .content_length(10)
        .location("http://peer:1/x")
        .build();

    assert!(head.headers.is_empty());
}

#[test]
fn test_builder_header_order() {
    let head = ResponseBuilder::new(StatusCode::Ok)
        .close(true)
        .server("srv")
        .content_length(0)
        .build();

    let names: Vec<_> = head.headers.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        names,
        vec!["Content-Type", "Content-Length", "Server", "Connection"]
    );
}
