use std::io::{Cursor, Read};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use shallow_net::protocol::{self, ErrorReply, Interaction, RandomRequest};
use shallow_net::Error;

use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub fn json_response<T: Serialize>(status: u16, body: &T) -> Response<Cursor<Vec<u8>>> {
    let bytes = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![Header::from_bytes(b"Content-Type", b"application/json").unwrap()],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn error_response(err: &Error) -> Response<Cursor<Vec<u8>>> {
    let status = match err {
        Error::InvalidInput(_) | Error::Shape(_) | Error::Json(_) => 400,
        Error::NotFound(_) => 404,
        Error::InvalidState(_) | Error::MissingCheckpoint(_) => 409,
        _ => 500,
    };
    if err.is_client_error() {
        debug!(error = %err, status, "request rejected");
    } else {
        warn!(error = %err, status, "request failed");
    }
    json_response(status, &ErrorReply { error: err.to_string() })
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    json_response(404, &ErrorReply { error: "404 Not Found".into() })
}

/// Largest request body accepted; a 784-value input fits comfortably.
const MAX_BODY_BYTES: u64 = 1 << 20;

fn read_json<T: DeserializeOwned>(request: &mut Request) -> Result<T, Error> {
    parse_body(request.as_reader())
}

fn parse_body<T: DeserializeOwned, R: Read>(reader: R) -> Result<T, Error> {
    let mut body = Vec::new();
    reader.take(MAX_BODY_BYTES + 1).read_to_end(&mut body)?;
    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(Error::InvalidInput(format!(
            "request body exceeds {} bytes",
            MAX_BODY_BYTES
        )));
    }
    Ok(serde_json::from_slice(&body)?)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the protocol handlers.
///
/// - `POST /interact`: `{"input": [...]}` → probabilities + activations
/// - `POST /random`: `{"label": 5}` or `{"label": "5"}` → the same plus `data`
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = url.split('?').next().unwrap_or("").to_owned();

    let response = match (method, path.as_str()) {
        (Method::Get, "/") | (Method::Get, "/health") => {
            let st = state.lock().unwrap();
            json_response(
                200,
                &serde_json::json!({
                    "model_loaded": st.model.is_ready(),
                    "dataset_loaded": st.dataset.is_some(),
                }),
            )
        }

        (Method::Post, "/interact") => match read_json::<Interaction>(&mut request) {
            Ok(req) => {
                let st = state.lock().unwrap();
                match protocol::handle_interaction(&st.model, &req) {
                    Ok(update) => json_response(200, &update),
                    Err(e) => error_response(&e),
                }
            }
            Err(e) => error_response(&e),
        },

        (Method::Post, "/random") => match read_json::<RandomRequest>(&mut request) {
            Ok(req) => {
                let mut st = state.lock().unwrap();
                let st = &mut *st;
                let result = match &st.dataset {
                    Some(dataset) => protocol::handle_random(&st.model, dataset, &req, &mut st.rng),
                    None => Err(Error::InvalidState("dataset is not loaded".into())),
                };
                match result {
                    Ok(update) => json_response(200, &update),
                    Err(e) => error_response(&e),
                }
            }
            Err(e) => error_response(&e),
        },

        _ => not_found(),
    };

    let _ = request.respond(response);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_utf8_body_is_a_bad_request() {
        let body: &[u8] = &[b'{', 0xFF, 0xFE, b'}'];
        let err = parse_body::<Interaction, _>(body).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert_eq!(error_response(&err).status_code(), StatusCode(400));
    }

    #[test]
    fn oversized_body_is_rejected() {
        let body = vec![b' '; MAX_BODY_BYTES as usize + 1];
        let err = parse_body::<Interaction, _>(body.as_slice()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn valid_body_parses() {
        let req: RandomRequest = parse_body(&br#"{"label": "3"}"#[..]).unwrap();
        assert_eq!(req.label, serde_json::json!("3"));
    }
}
