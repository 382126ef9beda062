pub mod persistent;
pub mod traits;

pub use persistent::{FileDocumentStore, FileObjectStore};
pub use traits::{
    generate_document_id, to_record, Blob, Document, DocumentStore, MemoryDocumentStore,
    MemoryObjectStore, ObjectStore, Record,
};
