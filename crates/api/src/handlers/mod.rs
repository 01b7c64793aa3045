pub mod captions;
