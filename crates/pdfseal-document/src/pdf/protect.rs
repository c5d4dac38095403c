// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF protection: rebuild converter output page by page and encrypt it
// with the generated password, using the `lopdf` crate.
//
// Converter output is never trusted as-is: every page (plus the resources it
// references and the attributes it inherits from the page tree) is copied
// into a fresh document with its own catalog and trailer /ID, then sealed
// with the standard security handler (RC4, 128-bit key, user password ==
// owner password).
//
// lopdf cannot reload a file whose user password is non-empty (the object
// table comes back empty), so the sealed document is checked in memory,
// before it replaces the converter output.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions,
    StringFormat, dictionary,
};
use pdfseal_core::error::{Result, SealError};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees with /Parent cycles.
const MAX_TREE_DEPTH: usize = 64;

/// RC4 key length in bits for the standard security handler.
const KEY_LENGTH_BITS: usize = 128;

/// Opens a converted PDF and produces a password-protected copy.
pub struct PdfProtector {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (used in errors).
    source_path: Option<PathBuf>,
}

impl PdfProtector {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            SealError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(
            pages = document.get_pages().len(),
            encrypted = document.is_encrypted(),
            "PDF loaded"
        );

        Ok(Self {
            document,
            source_path: Some(path_ref.to_path_buf()),
        })
    }

    /// Create a protector from raw PDF bytes already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            SealError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        Ok(Self {
            document,
            source_path: None,
        })
    }

    /// Wrap a document that is already loaded.
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            source_path: None,
        }
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn is_encrypted(&self) -> bool {
        self.document.is_encrypted()
    }

    // -- Pipeline steps -------------------------------------------------------

    /// Decrypt the document if the converter produced an encrypted file.
    ///
    /// Only `password` is tried. A freshly generated password can never open
    /// a file someone else locked, so an encrypted converter output ends up
    /// as [`SealError::ForeignEncryption`] rather than being silently
    /// re-wrapped.
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        if !self.document.is_encrypted() {
            return Ok(());
        }

        match self.document.decrypt(password) {
            Ok(()) => {
                debug!("converter output decrypted");
                Ok(())
            }
            Err(err) => {
                let path = self
                    .source_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("<memory>"));
                warn!(
                    path = %path.display(),
                    %err,
                    "converter output is encrypted with an unknown password"
                );
                Err(SealError::ForeignEncryption(path))
            }
        }
    }

    /// Copy every page into a fresh document with a new catalog, page tree
    /// and trailer /ID.
    pub fn rebuild(&self) -> Result<Document> {
        let source = &self.document;
        let mut target = Document::with_version(source.version.clone());
        let pages_id = target.new_object_id();
        let mut copier = ObjectCopier::new(source);

        let mut kids: Vec<Object> = Vec::new();
        for (page_number, page_id) in source.get_pages() {
            let new_page_id = copier.copy_reference(&mut target, page_id).ok_or_else(|| {
                SealError::PdfError(format!("page {} not found in page tree", page_number))
            })?;

            let inherited: Vec<(Vec<u8>, Object)> = inherited_attributes(source, page_id)
                .into_iter()
                .map(|(key, value)| {
                    let copied = copier.copy(&mut target, &value);
                    (key, copied)
                })
                .collect();

            match target.get_object_mut(new_page_id) {
                Ok(Object::Dictionary(page)) => {
                    for (key, value) in inherited {
                        page.set(key, value);
                    }
                    page.set("Parent", Object::Reference(pages_id));
                }
                _ => {
                    return Err(SealError::PdfError(format!(
                        "page {} is not a dictionary",
                        page_number
                    )));
                }
            }

            kids.push(Object::Reference(new_page_id));
        }

        let page_count = kids.len();
        target.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);
        set_document_id(&mut target);

        debug!(
            pages = page_count,
            objects = target.objects.len(),
            "document rebuilt"
        );
        Ok(target)
    }

    /// Rebuild and encrypt, returning the sealed document ready to write.
    pub fn seal(&self, password: &str) -> Result<Document> {
        let mut sealed = self.rebuild()?;
        seal_document(&mut sealed, password)?;
        Ok(sealed)
    }

    // -- End to end -----------------------------------------------------------

    /// Open → unlock → rebuild → encrypt → (verify) → atomically overwrite
    /// `path`.
    ///
    /// Returns the page count of the sealed document. With `verify` set, a
    /// sealed document that does not open with `password` or lost pages is
    /// reported as [`SealError::Verification`] and `path` is left as it was.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), verify = verify))]
    pub fn protect_in_place(
        path: impl AsRef<Path>,
        password: &str,
        verify: bool,
    ) -> Result<usize> {
        let path = path.as_ref();
        let mut protector = Self::open(path)?;
        protector.unlock(password)?;

        let pages = protector.page_count();
        if pages == 0 {
            return Err(SealError::PdfError(format!("{} has no pages", path.display())));
        }

        let mut sealed = protector.seal(password)?;
        if verify {
            verify_sealed(&sealed, password, pages)?;
        }
        write_atomically(&mut sealed, path)?;

        info!(pages, "PDF encrypted");
        Ok(pages)
    }
}

/// Check that `sealed` is encrypted, that `password` opens it and that it
/// still has `expected_pages` pages. Works on a decrypted copy.
#[instrument(skip_all, fields(expected_pages = expected_pages))]
pub fn verify_sealed(sealed: &Document, password: &str, expected_pages: usize) -> Result<()> {
    if !sealed.is_encrypted() {
        return Err(SealError::Verification("sealed document is not encrypted".into()));
    }

    let mut opened = sealed.clone();
    opened
        .decrypt(password)
        .map_err(|err| SealError::Verification(format!("password rejected: {}", err)))?;

    let pages = opened.get_pages().len();
    if pages != expected_pages {
        return Err(SealError::Verification(format!(
            "expected {} pages, found {}",
            expected_pages, pages
        )));
    }

    debug!(pages, "sealed document verified");
    Ok(())
}

/// Encrypt `document` in place with `password` as both user and owner
/// password.
pub fn seal_document(document: &mut Document, password: &str) -> Result<()> {
    if document.trailer.get(b"ID").is_err() {
        set_document_id(document);
    }

    let version = EncryptionVersion::V2 {
        document: &*document,
        owner_password: password,
        user_password: password,
        key_length: KEY_LENGTH_BITS,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version)
        .map_err(|err| SealError::Encryption(err.to_string()))?;

    document
        .encrypt(&state)
        .map_err(|err| SealError::Encryption(err.to_string()))?;
    Ok(())
}

/// Serialise `document` next to `path` and rename it over `path`.
pub fn write_atomically(document: &mut Document, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    // The temp file is created 0600; keep the mode of the file it replaces.
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        document.save_to(&mut writer).map_err(|err| {
            SealError::PdfError(format!("failed to serialise {}: {}", path.display(), err))
        })?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|err| SealError::Io(err.error))?;
    Ok(())
}

/// Give the document a fresh random trailer /ID (both halves equal).
fn set_document_id(document: &mut Document) {
    let mut id = vec![0u8; 16];
    OsRng.fill_bytes(&mut id);
    document.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
}

/// Collect inheritable attributes the page does not set itself, nearest
/// ancestor first.
fn inherited_attributes(source: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
    let Ok(page) = source.get_dictionary(page_id) else {
        return found;
    };

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        if depth >= MAX_TREE_DEPTH {
            warn!(?page_id, "page tree too deep, ignoring further ancestors");
            break;
        }
        let Ok(node) = source.get_dictionary(node_id) else {
            break;
        };

        for key in INHERITABLE_KEYS {
            let already = page.has(key) || found.iter().any(|(k, _)| k.as_slice() == key);
            if already {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key.to_vec(), value.clone()));
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    found
}

/// Deep-copies objects from one document into another, copying each
/// referenced object once.
///
/// `/Parent` entries are dropped; the caller re-links pages to the new page
/// tree. Without this every page would drag the whole source tree along.
struct ObjectCopier<'a> {
    source: &'a Document,
    /// Source object id → target object id.
    copied: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            copied: BTreeMap::new(),
        }
    }

    /// Copy the object behind `id`, returning its id in `target`. Returns
    /// `None` if the source has no such object.
    fn copy_reference(&mut self, target: &mut Document, id: ObjectId) -> Option<ObjectId> {
        if let Some(&existing) = self.copied.get(&id) {
            return Some(existing);
        }

        let source = self.source;
        let object = source.get_object(id).ok()?;

        // Register before recursing so reference cycles terminate.
        let new_id = target.new_object_id();
        self.copied.insert(id, new_id);

        let cloned = self.copy(target, object);
        target.objects.insert(new_id, cloned);
        Some(new_id)
    }

    fn copy(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(target, dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy(target, item)).collect())
            }
            Object::Reference(id) => match self.copy_reference(target, *id) {
                Some(new_id) => Object::Reference(new_id),
                None => {
                    warn!(?id, "Cannot resolve reference, using Null");
                    Object::Null
                }
            },
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dictionary(target, &stream.dict);
                Object::Stream(copied)
            }
            // Boolean, Integer, Real, String, Name, Null
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.copy(target, value));
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_pdf;

    fn write_sample(dir: &Path, name: &str, pages: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, sample_pdf(pages).unwrap()).unwrap();
        path
    }

    #[test]
    fn rebuild_keeps_pages_and_inherited_resources() {
        let protector = PdfProtector::from_bytes(&sample_pdf(3).unwrap()).unwrap();
        assert_eq!(protector.page_count(), 3);

        let rebuilt = protector.rebuild().unwrap();
        let pages = rebuilt.get_pages();
        assert_eq!(pages.len(), 3);

        for page_id in pages.values() {
            let page = rebuilt.get_dictionary(*page_id).unwrap();
            // Resources and MediaBox live on the source /Pages node.
            assert!(page.has(b"Resources"));
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Contents"));
        }
        assert!(rebuilt.trailer.get(b"ID").is_ok());
    }

    #[test]
    fn shared_resources_are_copied_once() {
        let protector = PdfProtector::from_bytes(&sample_pdf(4).unwrap()).unwrap();
        let rebuilt = protector.rebuild().unwrap();

        let fonts = rebuilt
            .objects
            .values()
            .filter(|obj| match obj {
                Object::Dictionary(d) => d
                    .get(b"Type")
                    .and_then(Object::as_name)
                    .map(|n| n == b"Font")
                    .unwrap_or(false),
                _ => false,
            })
            .count();
        assert_eq!(fonts, 1);
    }

    const PASSWORD: &str = "Xy7!abcdEFGH1234$%^&*qwe";

    fn sealed_sample(pages: usize, password: &str) -> Document {
        let protector = PdfProtector::from_bytes(&sample_pdf(pages).unwrap()).unwrap();
        protector.seal(password).unwrap()
    }

    #[test]
    fn sealed_document_opens_with_its_password() {
        let sealed = sealed_sample(2, PASSWORD);
        verify_sealed(&sealed, PASSWORD, 2).unwrap();
    }

    #[test]
    fn protect_in_place_writes_an_encrypted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "UTS.pdf", 2);

        let pages = PdfProtector::protect_in_place(&path, PASSWORD, true).unwrap();
        assert_eq!(pages, 2);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.windows(8).any(|w| w == b"/Encrypt"));
        assert!(!bytes.windows(14).any(|w| w == b"Question sheet"));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let sealed = sealed_sample(1, "Right#Password1");
        let err = verify_sealed(&sealed, "Wrong#Password2", 1).unwrap_err();
        assert!(matches!(err, SealError::Verification(_)));
    }

    #[test]
    fn page_count_mismatch_fails_verification() {
        let sealed = sealed_sample(2, PASSWORD);
        let err = verify_sealed(&sealed, PASSWORD, 3).unwrap_err();
        assert!(err.to_string().contains("expected 3 pages"));
    }

    #[test]
    fn unencrypted_document_fails_verification() {
        let plain = PdfProtector::from_bytes(&sample_pdf(1).unwrap())
            .unwrap()
            .rebuild()
            .unwrap();
        let err = verify_sealed(&plain, "anything", 1).unwrap_err();
        assert!(err.to_string().contains("not encrypted"));
    }

    #[test]
    fn encrypted_input_unlocks_only_with_its_password() {
        let mut right = PdfProtector::from_document(sealed_sample(3, "Someone#Else9"));
        assert!(right.is_encrypted());
        right.unlock("Someone#Else9").unwrap();
        assert_eq!(right.page_count(), 3);

        let mut wrong = PdfProtector::from_document(sealed_sample(3, "Someone#Else9"));
        let err = wrong.unlock("Fresh#Password1").unwrap_err();
        assert!(matches!(err, SealError::ForeignEncryption(_)));
    }

    #[test]
    fn foreign_encryption_on_disk_is_explicit_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        let mut sealed = sealed_sample(1, "Someone#Else9");
        write_atomically(&mut sealed, &path).unwrap();

        let err = PdfProtector::protect_in_place(&path, "Fresh#Password1", true).unwrap_err();
        match err {
            SealError::ForeignEncryption(p) => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn sealing_keeps_the_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "KUIS.pdf", 1);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        PdfProtector::protect_in_place(&path, PASSWORD, false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn garbage_input_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfProtector::protect_in_place(&path, "Pw#12345abcd", true).unwrap_err();
        assert!(matches!(err, SealError::PdfError(_)));
        // The original file is left untouched.
        assert_eq!(std::fs::read(&path).unwrap(), b"this is not a pdf");
    }
}
