//! Infrastructure services

mod document_qa_service;

pub use document_qa_service::{DocumentQaService, DocumentQaServiceTrait};
