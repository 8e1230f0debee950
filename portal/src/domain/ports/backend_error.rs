//! Failures shared by every call to the portal REST backend.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by backend gateway adapters.
    pub enum BackendError {
        /// The request never produced a response.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// The request exceeded its time budget.
        Timeout { message: String } =>
            "backend request timed out: {message}",
        /// The backend answered with a non-success status.
        ///
        /// `message` is the backend's `{message}` text verbatim and `code` its
        /// optional machine-readable error code.
        Rejected { status: u16, message: String, code: Option<String> } =>
            "backend rejected request with status {status}: {message}",
        /// The backend answered with a non-success status and a body carrying
        /// neither a `message` nor a `code`.
        ///
        /// `preview` is a compacted excerpt of the body, for logs only.
        Unparsed { status: u16, preview: String } =>
            "backend returned status {status} with an unrecognised body: {preview}",
        /// A success response could not be decoded.
        Decode { message: String } =>
            "backend response decode failed: {message}",
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn unparsed_errors_name_the_status() {
        let error = BackendError::unparsed(502_u16, "<html>Bad Gateway</html>");
        assert_eq!(
            error.to_string(),
            "backend returned status 502 with an unrecognised body: <html>Bad Gateway</html>"
        );
    }

    #[test]
    fn rejected_errors_keep_code_and_message() {
        let error = BackendError::rejected(
            409_u16,
            "email already exists",
            Some("duplicate_email".to_owned()),
        );
        assert_eq!(
            error.to_string(),
            "backend rejected request with status 409: email already exists"
        );
        assert!(matches!(
            error,
            BackendError::Rejected { code: Some(ref code), .. } if code == "duplicate_email"
        ));
    }
}
