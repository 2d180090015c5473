//! Status-code interpretation.
//!
//! Rules, first match wins:
//! 1. transport failure (no status at all) -> `Unknown(cause)`
//! 2. 401 -> `Unauthorized`
//! 3. 204 -> `NoContent`, single-item endpoints only
//! 4. outside 200..=299 -> `BadStatus(code)`
//! 5. otherwise the response goes on to decoding
//!
//! List endpoints deliberately skip rule 3: a 204 there reaches the decoder
//! and is judged on its body like any other 2xx.

use crate::error::ApiError;
use crate::http::{HttpResponse, TransportOutcome};

/// Which payload shape an endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    List,
    Item,
}

pub fn classify(outcome: TransportOutcome, shape: Shape) -> Result<HttpResponse, ApiError> {
    let response = match outcome {
        TransportOutcome::Response(response) => response,
        TransportOutcome::Failure(cause) => {
            log::warn!("transport failure: {cause}");
            return Err(ApiError::Unknown(cause));
        }
    };

    log::debug!(
        "response {} ({}, {} bytes)",
        response.status,
        response.header("Content-Type").unwrap_or("no content type"),
        response.body.len()
    );

    match response.status {
        401 => Err(ApiError::Unauthorized),
        204 if shape == Shape::Item => Err(ApiError::NoContent),
        status if !(200..=299).contains(&status) => Err(ApiError::BadStatus(status)),
        _ => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportErrorKind};

    fn status(code: u16) -> TransportOutcome {
        TransportOutcome::Response(HttpResponse::new(code, Vec::new()))
    }

    #[test]
    fn unauthorized_wins_over_bad_status() {
        for shape in [Shape::List, Shape::Item] {
            assert_eq!(classify(status(401), shape), Err(ApiError::Unauthorized));
        }
    }

    #[test]
    fn no_content_only_for_items() {
        assert_eq!(classify(status(204), Shape::Item), Err(ApiError::NoContent));
        assert!(classify(status(204), Shape::List).is_ok());
    }

    #[test]
    fn non_2xx_is_bad_status() {
        assert_eq!(classify(status(404), Shape::Item), Err(ApiError::BadStatus(404)));
        assert_eq!(classify(status(500), Shape::List), Err(ApiError::BadStatus(500)));
        assert_eq!(classify(status(302), Shape::List), Err(ApiError::BadStatus(302)));
    }

    #[test]
    fn transport_failure_is_unknown() {
        let cause = TransportError::new(TransportErrorKind::Connect, "connection refused");
        let outcome = TransportOutcome::Failure(cause.clone());
        assert_eq!(classify(outcome, Shape::Item), Err(ApiError::Unknown(cause)));
    }

    #[test]
    fn success_passes_response_through() {
        let outcome = TransportOutcome::Response(HttpResponse::new(201, b"{}".to_vec()));
        let response = classify(outcome, Shape::Item).unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, b"{}");
    }
}
