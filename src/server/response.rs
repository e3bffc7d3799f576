use crate::dispatcher::DispatchOutcome;
use may_minihttp::Response;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Full header line for a content type. The response API wants `&'static`
/// header lines, and every content type in the system comes from a closed
/// table, so this stays a match rather than an allocation.
fn content_type_header(mime: &'static str) -> &'static str {
    match mime {
        "application/json" => "Content-Type: application/json",
        "text/plain" => "Content-Type: text/plain",
        "text/html" => "Content-Type: text/html",
        "text/css" => "Content-Type: text/css",
        "application/javascript" => "Content-Type: application/javascript",
        "image/svg+xml" => "Content-Type: image/svg+xml",
        "image/png" => "Content-Type: image/png",
        "image/jpeg" => "Content-Type: image/jpeg",
        "image/gif" => "Content-Type: image/gif",
        "image/x-icon" => "Content-Type: image/x-icon",
        "application/wasm" => "Content-Type: application/wasm",
        "application/pdf" => "Content-Type: application/pdf",
        _ => "Content-Type: application/octet-stream",
    }
}

/// Write a finalized dispatch outcome to the socket. The single write point
/// for the network path.
pub fn write_outcome(res: &mut Response, outcome: DispatchOutcome) {
    res.status_code(outcome.status as usize, status_reason(outcome.status));
    res.header(content_type_header(outcome.content_type));
    res.body_vec(outcome.body);
}
