use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use std::collections::HashMap;

pub(crate) struct Upload {
    pub(crate) file_name: String,
    pub(crate) data: Bytes,
}

/// A parsed `multipart/form-data` body. Parts with a file name are uploads, the others text.
#[derive(Default)]
pub(crate) struct Form {
    files: HashMap<String, Upload>,
    fields: HashMap<String, String>,
}

impl Form {
    pub(crate) async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };
            match field.file_name().map(ToOwned::to_owned) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    form.files.insert(name, Upload { file_name, data });
                }
                None => {
                    form.fields.insert(name, field.text().await?);
                }
            }
        }
        Ok(form)
    }

    /// Empty file parts count as no upload.
    pub(crate) fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name).filter(|upload| !upload.data.is_empty())
    }

    pub(crate) fn take_text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}
