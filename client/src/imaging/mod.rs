pub mod normalize;
pub mod validation;

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub declared_size: u64,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn from_bytes(bytes: Vec<u8>, file_name: Option<String>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            bytes,
            declared_size,
            file_name,
        }
    }
}
