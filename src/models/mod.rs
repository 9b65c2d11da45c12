pub mod document;
pub mod document_type;
pub mod extraction;
pub mod payment;

pub use document::{Document, ProcessingState, SourceClassification};
pub use document_type::DocumentType;
pub use extraction::{
    BoundingBox, CompoundExtraction, Extraction, ExtractionsContainer, ReturnReason,
    SpecificExtraction,
};
pub use payment::{
    Payment, PaymentProvider, PaymentRequest, PaymentRequestInput, PaymentRequestStatus,
    ResolvePaymentInput,
};
