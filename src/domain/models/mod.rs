pub mod config;
pub mod email_template;
pub mod field_lock;
pub mod fields;
pub mod influencer;
pub mod requirements;
pub mod workflow;

pub use config::{
    CommerceConfig, Config, DatabaseConfig, EmailConfig, LoggingConfig, PortalConfig, RetryConfig,
};
pub use email_template::{
    EmailTemplate, EmailTemplates, RenderedEmail, TemplateVariables, COUNTERPROPOSAL_ACCEPTED_KEY,
    COUNTERPROPOSAL_KEY,
};
pub use field_lock::{is_field_locked, lock_matrix, locked_fields, FieldLockState};
pub use fields::{FieldGroup, WorkflowField, WorkflowFieldsUpdate};
pub use influencer::{Influencer, InfluencerStatus, NewInfluencer};
pub use requirements::missing_fields;
pub use workflow::{
    ContractDetails, EmailRecord, PartnershipWorkflow, PreparationDetails, ShipmentDetails,
    ShippingAddress, ShippingDetails, TermsDetails, WorkflowStatus, WorkflowStep,
};
