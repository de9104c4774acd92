pub mod anniversary;
pub mod anniversary_input;
pub mod collab;
pub mod collab_input;
pub mod entry;
pub mod entry_input;
pub mod invitation;
pub mod invitation_input;
pub mod notification;
pub mod notification_input;
pub mod user;
pub mod user_input;

pub use anniversary::Anniversary;
pub use anniversary_input::{AnniversaryMutationResponse, CreateAnniversaryInput, UpdateAnniversaryInput};
pub use collab::{CollabDraft, FinalCollabEntry};
pub use collab_input::{CollabMutationResponse, SubmitContributionInput};
pub use entry::Entry;
pub use entry_input::{CreateEntryInput, EntryMutationResponse};
pub use invitation::Invitation;
pub use invitation_input::{CreateInvitationInput, InvitationMutationResponse, RespondInvitationInput};
pub use notification::{Notification, Reaction};
pub use notification_input::{CreateReactionInput, MarkReadInput, NudgeInput, NotificationMutationResponse};
pub use user::UserProfile;
pub use user_input::{JoinPairingInput, PairingCodeResponse, UpdateProfileInput, UploadResponse};
