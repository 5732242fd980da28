use std::fmt::{Display, Formatter};
use std::io::Cursor;

use rocket::http::hyper::header::CONTENT_LANGUAGE;
use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::{ConflictKind, WorkflowError};

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert<V: Serialize>(&mut self, key: impl ToString, value: V) -> &mut Problem {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.body.insert(key.to_string(), value);
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body;

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(instance) = self.instance_uri {
            body.insert(String::from("instance"), Value::from(instance));
        }

        let body_string = Value::Object(body).to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header(CONTENT_LANGUAGE.as_str(), "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn unauthorized(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn not_configured() -> Problem {
        Problem::new_untyped(Status::InternalServerError, "Internal Server Error")
    }
}

impl From<WorkflowError> for Problem {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Invalid(fields) => {
                Problem::new_untyped(Status::UnprocessableEntity, "Invalid request.")
                    .insert("errors", fields)
                    .clone()
            }
            WorkflowError::Denied => Problem::new_untyped(Status::Forbidden, "Permission Denied"),
            WorkflowError::NotFound(msg) => Problem::new_untyped(Status::NotFound, msg),
            WorkflowError::Conflict { kind, message } => {
                let status = match kind {
                    ConflictKind::Duplicate => Status::Conflict,
                    ConflictKind::State | ConflictKind::NoChanges => Status::BadRequest,
                    ConflictKind::Unchanged => Status::NotModified,
                };
                Problem::new_untyped(status, message)
            }
            WorkflowError::Infrastructure { public, .. } => {
                Problem::new_untyped(Status::InternalServerError, public)
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => problems::unauthorized("Expired JWT signature."),
            _ => problems::unauthorized("Error while handling JWT."),
        }
    }
}
