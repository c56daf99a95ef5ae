//! Job descriptors handed to the automation worker.
//!
//! A [`JobDescriptor`] is built once per dispatch call from a validated
//! [`MessageBody`] and a non-empty [`RecipientSet`], and is immutable from
//! then on. Its wire form is the single JSON argument the worker receives:
//!
//! ```json
//! {"phoneNumbers":["+905321112233"],"message":"Merhaba"}
//! ```

use crate::error::{DispatchError, Result};
use crate::phone::{PhoneNumber, RecipientSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a new random job identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The text sent to every recipient. Never empty; otherwise passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate a message body.
    ///
    /// Returns `ValidationError` for an absent or blank body. The text itself
    /// is kept verbatim, surrounding whitespace included.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DispatchError::ValidationError(
                "message body is empty".to_string(),
            ));
        }
        Ok(Self(text))
    }

    /// Returns the body as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable description of one batch: who receives what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    id: JobId,
    body: MessageBody,
    recipients: Vec<PhoneNumber>,
}

/// Wire shape of the worker's invocation argument.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerPayload<'a> {
    phone_numbers: &'a [PhoneNumber],
    message: &'a str,
}

impl JobDescriptor {
    /// Create a job for a non-empty recipient set.
    pub fn new(body: MessageBody, recipients: &RecipientSet) -> Result<Self> {
        if recipients.is_empty() {
            return Err(DispatchError::ValidationError(
                "no usable phone numbers were supplied".to_string(),
            ));
        }

        Ok(Self {
            id: JobId::new_random(),
            body,
            recipients: recipients.to_vec(),
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Recipients in the order the worker will process them.
    pub fn recipients(&self) -> &[PhoneNumber] {
        &self.recipients
    }

    /// Serialize the job into the worker's single JSON argument.
    ///
    /// The output is one line: newlines inside the message are escaped.
    pub fn to_payload(&self) -> Result<String> {
        let payload = WorkerPayload {
            phone_numbers: &self.recipients,
            message: self.body.as_str(),
        };
        serde_json::to_string(&payload).map_err(|e| {
            DispatchError::UserError(format!("failed to serialize job payload: {}", e))
        })
    }
}
