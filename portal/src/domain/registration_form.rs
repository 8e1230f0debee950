//! Registration form state machine.
//!
//! Owns the draft, the photo slot and the submit phase so the rendering
//! layer only has to ask [`RegistrationForm::can_submit`] and forward user
//! intents. Phases move `editing -> submitting -> confirmed`; a failed submit
//! returns to editing with the error attached and the draft intact.

use std::path::Path;

use tracing::debug;

use super::photo::{Photo, PhotoError};
use super::ports::RegistrationGateway;
use super::registration::RegistrationDraft;
use super::registration_service::RegistrationService;
use super::submission::{RegistrationReceipt, SubmissionError, SubmissionResult};

/// Submit lifecycle of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    /// Accepting input; carries the outcome of the previous failed submit.
    Editing {
        /// Error from the last submit, cleared by the next one.
        last_error: Option<SubmissionError>,
    },
    /// A submit is outstanding.
    Submitting,
    /// The backend accepted the registration.
    Confirmed {
        /// Response body of the accepted registration.
        receipt: RegistrationReceipt,
    },
}

/// Photo attachment progress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoSlot {
    /// Nothing attached.
    #[default]
    Empty,
    /// A file is being read.
    Loading,
    /// The photo is attached to the draft.
    Ready(Photo),
}

/// Form intents refused in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// A submit is already outstanding.
    #[error("a registration is already being submitted")]
    Busy,
    /// A photo is still loading.
    #[error("wait for the photo to finish loading")]
    PhotoLoading,
    /// The registration was accepted; start over to register again.
    #[error("this registration has already been submitted")]
    AlreadyConfirmed,
    /// The submit itself failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Form holding one member's in-progress registration.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    draft: Option<RegistrationDraft>,
    photo: PhotoSlot,
    phase: FormPhase,
}

impl RegistrationForm {
    /// Form in the editing phase around `draft`.
    pub fn new(draft: RegistrationDraft) -> Self {
        Self {
            draft: Some(draft),
            photo: PhotoSlot::Empty,
            phase: FormPhase::Editing { last_error: None },
        }
    }

    /// Current draft; `None` once it was discarded after a successful submit.
    pub fn draft(&self) -> Option<&RegistrationDraft> {
        self.draft.as_ref()
    }

    /// Current submit phase.
    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    /// Photo attachment progress.
    pub fn photo(&self) -> &PhotoSlot {
        &self.photo
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, FormPhase::Editing { .. })
            && !matches!(self.photo, PhotoSlot::Loading)
            && self.draft.is_some()
    }

    /// Apply `edit` to the draft.
    ///
    /// # Errors
    ///
    /// Refused while submitting or after confirmation.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut RegistrationDraft) -> R) -> Result<R, FormError> {
        let draft = self.editable_draft()?;
        Ok(edit(draft))
    }

    /// Mark the photo slot as loading.
    ///
    /// # Errors
    ///
    /// Refused while submitting, after confirmation or while another photo
    /// is loading.
    pub fn begin_photo_load(&mut self) -> Result<(), FormError> {
        self.editable_draft()?;
        if matches!(self.photo, PhotoSlot::Loading) {
            return Err(FormError::PhotoLoading);
        }
        self.photo = PhotoSlot::Loading;
        Ok(())
    }

    /// Settle a load started by [`Self::begin_photo_load`].
    ///
    /// A failed load leaves the slot and the draft without a photo.
    ///
    /// # Errors
    ///
    /// Returns the load failure unchanged.
    pub fn finish_photo_load(&mut self, loaded: Result<Photo, PhotoError>) -> Result<(), PhotoError> {
        let draft_photo = match loaded {
            Ok(photo) => {
                self.photo = PhotoSlot::Ready(photo.clone());
                Some(photo)
            }
            Err(error) => {
                debug!(error = %error, "photo rejected");
                self.photo = PhotoSlot::Empty;
                if let Some(draft) = self.draft.as_mut() {
                    draft.photo = None;
                }
                return Err(error);
            }
        };
        if let Some(draft) = self.draft.as_mut() {
            draft.photo = draft_photo;
        }
        Ok(())
    }

    /// Load `path` into the photo slot.
    ///
    /// # Errors
    ///
    /// [`FormError`] when loading is not allowed now; the inner
    /// [`PhotoError`] when the file is unusable.
    pub async fn attach_photo(&mut self, path: &Path) -> Result<Result<(), PhotoError>, FormError> {
        self.begin_photo_load()?;
        let loaded = Photo::load(path).await;
        Ok(self.finish_photo_load(loaded))
    }

    /// Detach any photo.
    ///
    /// # Errors
    ///
    /// Refused while submitting, after confirmation or while a photo is
    /// loading.
    pub fn remove_photo(&mut self) -> Result<(), FormError> {
        if matches!(self.photo, PhotoSlot::Loading) {
            return Err(FormError::PhotoLoading);
        }
        let draft = self.editable_draft()?;
        draft.photo = None;
        self.photo = PhotoSlot::Empty;
        Ok(())
    }

    /// Enter the submitting phase and hand out the draft to send.
    ///
    /// # Errors
    ///
    /// [`FormError::Busy`] when a submit is outstanding,
    /// [`FormError::PhotoLoading`] while a photo loads and
    /// [`FormError::AlreadyConfirmed`] after success.
    pub fn begin_submit(&mut self) -> Result<RegistrationDraft, FormError> {
        if matches!(self.photo, PhotoSlot::Loading) {
            return Err(FormError::PhotoLoading);
        }
        let draft = self.editable_draft()?.clone();
        self.phase = FormPhase::Submitting;
        Ok(draft)
    }

    /// Record the outcome of the outstanding submit.
    ///
    /// Success discards the draft and the photo; failure keeps both.
    pub fn complete_submit(&mut self, result: SubmissionResult) {
        self.phase = match result {
            Ok(receipt) => {
                self.draft = None;
                self.photo = PhotoSlot::Empty;
                FormPhase::Confirmed { receipt }
            }
            Err(error) => FormPhase::Editing {
                last_error: Some(error),
            },
        };
    }

    /// Submit through `service`, driving the phase for the whole round trip.
    ///
    /// # Errors
    ///
    /// [`FormError`] when the form refuses to submit now, or
    /// [`FormError::Submission`] with the failure recorded in the phase.
    pub async fn submit_with<G>(
        &mut self,
        service: &RegistrationService<G>,
    ) -> Result<RegistrationReceipt, FormError>
    where
        G: RegistrationGateway,
    {
        let draft = self.begin_submit()?;
        let result = service.submit(&draft).await;
        self.complete_submit(result.clone());
        result.map_err(FormError::from)
    }

    /// Replace a confirmed or abandoned draft with `draft`.
    ///
    /// # Errors
    ///
    /// Refused while a submit is outstanding.
    pub fn start_over(&mut self, draft: RegistrationDraft) -> Result<(), FormError> {
        if matches!(self.phase, FormPhase::Submitting) {
            return Err(FormError::Busy);
        }
        *self = Self::new(draft);
        Ok(())
    }

    fn editable_draft(&mut self) -> Result<&mut RegistrationDraft, FormError> {
        match self.phase {
            FormPhase::Submitting => return Err(FormError::Busy),
            FormPhase::Confirmed { .. } => return Err(FormError::AlreadyConfirmed),
            FormPhase::Editing { .. } => {}
        }
        self.draft.as_mut().ok_or(FormError::AlreadyConfirmed)
    }
}
