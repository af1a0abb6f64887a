/// An image picked for upload (post image or profile photo).
#[derive(Clone)]
pub struct ImageUpload {
    /// The original file name, sent as the multipart file name.
    pub filename: String,
    /// The raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// The MIME type sniffed from the file contents.
    pub fn mime_type(&self) -> Option<&'static str> {
        infer::get(&self.bytes).map(|kind| kind.mime_type())
    }

    pub fn is_image(&self) -> bool {
        infer::is_image(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("size", &self.bytes.len())
            .finish()
    }
}
