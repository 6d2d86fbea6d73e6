//! The outgoing message builder.
//!
//! A [`Message`] accumulates everything the remote API needs for one email.
//! Setters take `&mut self` and return `&mut Self` so calls can be chained;
//! input that fails validation leaves the message unchanged instead of
//! returning an error.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::{is_valid_address, AddressBook, IntoAddressEntries};
use crate::attachment::{
    file_mime_type, is_image_type, read_regular_file, AttachOptions, Attachment, MagicSniffer,
    MimeSniffer,
};
use crate::schema::{
    Headers, MergeLanguage, MergeVar, RecipientMergeVars, RecipientMetadata, RecipientType,
    WireMessage, WireRecipient,
};

/// Longest tag accepted by the remote API, in bytes.
pub const MAX_TAG_LEN: usize = 50;

/// Sender used when a message does not set one explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderDefaults {
    /// Application name, used as the from name.
    #[serde(default)]
    pub name: String,
    /// Administrator address, used as the from address.
    #[serde(default)]
    pub address: String,
}

impl SenderDefaults {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    defaults: SenderDefaults,
    sniffer: Arc<dyn MimeSniffer>,
    from_address: Option<String>,
    from_name: Option<String>,
    to: AddressBook,
    reply_to: AddressBook,
    cc: AddressBook,
    bcc: AddressBook,
    tags: Vec<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<Attachment>,
    images: Vec<Attachment>,
    is_async: bool,
    send_at: Option<DateTime<Utc>>,
    template_name: Option<String>,
    template_content: Vec<MergeVar>,
    use_template_defaults: bool,
    global_merge_vars: Vec<MergeVar>,
    merge_vars: Vec<RecipientMergeVars>,
    metadata: Map<String, Value>,
    recipient_metadata: Vec<RecipientMetadata>,
    google_analytics_domains: Vec<String>,
    google_analytics_campaign: Option<String>,
    merge_language: MergeLanguage,
    subaccount: Option<String>,
    important: bool,
    track_opens: bool,
    track_clicks: bool,
}

impl Default for Message {
    fn default() -> Self {
        Self::new(SenderDefaults::default())
    }
}

impl Message {
    pub fn new(defaults: SenderDefaults) -> Self {
        Self {
            defaults,
            sniffer: Arc::new(MagicSniffer),
            from_address: None,
            from_name: None,
            to: AddressBook::new(),
            reply_to: AddressBook::new(),
            cc: AddressBook::new(),
            bcc: AddressBook::new(),
            tags: Vec::new(),
            subject: None,
            text: None,
            html: None,
            attachments: Vec::new(),
            images: Vec::new(),
            is_async: false,
            send_at: None,
            template_name: None,
            template_content: Vec::new(),
            use_template_defaults: false,
            global_merge_vars: Vec::new(),
            merge_vars: Vec::new(),
            metadata: Map::new(),
            recipient_metadata: Vec::new(),
            google_analytics_domains: Vec::new(),
            google_analytics_campaign: None,
            merge_language: MergeLanguage::Mailchimp,
            subaccount: None,
            important: false,
            track_opens: true,
            track_clicks: true,
        }
    }

    /// Replace the content sniffer used by attach and embed.
    pub fn with_sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    // ----- sender -----

    /// Set the from address and clear the from name.
    pub fn set_from(&mut self, address: &str) -> &mut Self {
        if is_valid_address(address) {
            self.from_address = Some(address.to_string());
            self.from_name = None;
        }
        self
    }

    /// Set the from address with a display name. A blank name clears it.
    pub fn set_from_named(&mut self, address: &str, name: &str) -> &mut Self {
        if !is_valid_address(address) {
            return self;
        }
        self.from_address = Some(address.to_string());
        let name = name.trim();
        self.from_name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// `Name<address>`, the bare name or address if only one is known, or
    /// `None` when neither is.
    pub fn from(&self) -> Option<String> {
        match (self.from_name(), self.from_address()) {
            (Some(name), Some(address)) => Some(format!("{name}<{address}>")),
            (Some(name), None) => Some(name.to_string()),
            (None, Some(address)) => Some(address.to_string()),
            (None, None) => None,
        }
    }

    /// The effective from address, after applying sender defaults.
    pub fn from_address(&self) -> Option<&str> {
        if self.use_template_defaults {
            return self.from_address.as_deref();
        }
        self.from_address
            .as_deref()
            .or_else(|| non_empty(&self.defaults.address))
    }

    /// The effective from name, after applying sender defaults.
    pub fn from_name(&self) -> Option<&str> {
        if self.use_template_defaults {
            return self.from_name.as_deref();
        }
        self.from_name
            .as_deref()
            .or_else(|| non_empty(&self.defaults.name))
    }

    /// Leave an unset sender empty so the remote template supplies it.
    pub fn enable_template_defaults(&mut self) -> &mut Self {
        self.use_template_defaults = true;
        self
    }

    pub fn disable_template_defaults(&mut self) -> &mut Self {
        self.use_template_defaults = false;
        self
    }

    pub fn uses_template_defaults(&self) -> bool {
        self.use_template_defaults
    }

    // ----- recipients -----

    pub fn set_to(&mut self, to: impl IntoAddressEntries) -> &mut Self {
        self.to.add(to);
        self
    }

    pub fn to(&self) -> &AddressBook {
        &self.to
    }

    pub fn set_reply_to(&mut self, reply_to: impl IntoAddressEntries) -> &mut Self {
        self.reply_to.add(reply_to);
        self
    }

    pub fn reply_to(&self) -> &AddressBook {
        &self.reply_to
    }

    pub fn set_cc(&mut self, cc: impl IntoAddressEntries) -> &mut Self {
        self.cc.add(cc);
        self
    }

    pub fn cc(&self) -> &AddressBook {
        &self.cc
    }

    pub fn set_bcc(&mut self, bcc: impl IntoAddressEntries) -> &mut Self {
        self.bcc.add(bcc);
        self
    }

    pub fn bcc(&self) -> &AddressBook {
        &self.bcc
    }

    // ----- content -----

    /// Stored trimmed, otherwise verbatim.
    pub fn set_subject(&mut self, subject: &str) -> &mut Self {
        self.subject = Some(subject.trim().to_string());
        self
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn set_text_body(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn text_body(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_html_body(&mut self, html: impl Into<String>) -> &mut Self {
        self.html = Some(html.into());
        self
    }

    pub fn html_body(&self) -> Option<&str> {
        self.html.as_deref()
    }

    // ----- tags -----

    /// Add a tag. Tags over [`MAX_TAG_LEN`] bytes, tags starting with `_`
    /// and duplicates are ignored.
    pub fn add_tag(&mut self, tag: &str) -> &mut Self {
        if self.is_tag_valid(tag) {
            self.tags.push(tag.to_string());
        }
        self
    }

    pub fn add_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.add_tag(tag.as_ref());
        }
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    fn is_tag_valid(&self, tag: &str) -> bool {
        !tag.is_empty()
            && tag.len() <= MAX_TAG_LEN
            && !tag.starts_with('_')
            && !self.tags.iter().any(|existing| existing == tag)
    }

    // ----- attachments -----

    /// Attach a file from disk. Missing paths and directories are ignored.
    ///
    /// The name defaults to the file name and the type to the detected
    /// MIME type of the file.
    pub fn attach(&mut self, path: impl AsRef<Path>, options: AttachOptions) -> &mut Self {
        let path = path.as_ref();
        let Some(bytes) = read_regular_file(path) else {
            return self;
        };
        let options = self.file_options(path, &bytes, options);
        self.attach_content(&bytes, options)
    }

    /// Attach raw bytes. Empty content is ignored.
    pub fn attach_content(&mut self, content: &[u8], options: AttachOptions) -> &mut Self {
        if content.is_empty() {
            return self;
        }
        let name = options
            .file_name
            .unwrap_or_else(|| format!("file_{}", self.attachments.len()));
        let mime_type = options
            .content_type
            .unwrap_or_else(|| self.sniffer.sniff(content));
        self.attachments
            .push(Attachment::encode(name, mime_type, content));
        self
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Embed an image file from disk. Files that are not images are ignored.
    pub fn embed(&mut self, path: impl AsRef<Path>, options: AttachOptions) -> &mut Self {
        let path = path.as_ref();
        let Some(bytes) = read_regular_file(path) else {
            return self;
        };
        if !is_image_type(&file_mime_type(path, &bytes, self.sniffer.as_ref())) {
            tracing::trace!(
                target: "mandrill",
                "Not embedding non-image file {}",
                path.display()
            );
            return self;
        }
        let options = self.file_options(path, &bytes, options);
        self.embed_content(&bytes, options)
    }

    /// Embed raw image bytes. The detected type of the content must be an
    /// image, whatever `options.content_type` declares.
    pub fn embed_content(&mut self, content: &[u8], options: AttachOptions) -> &mut Self {
        if content.is_empty() {
            return self;
        }
        let sniffed = self.sniffer.sniff(content);
        if !is_image_type(&sniffed) {
            tracing::trace!(target: "mandrill", "Not embedding content detected as {sniffed}");
            return self;
        }
        let name = options
            .file_name
            .unwrap_or_else(|| format!("file_{}", self.images.len()));
        let mime_type = options.content_type.unwrap_or(sniffed);
        self.images.push(Attachment::encode(name, mime_type, content));
        self
    }

    pub fn embedded_content(&self) -> &[Attachment] {
        &self.images
    }

    fn file_options(&self, path: &Path, bytes: &[u8], options: AttachOptions) -> AttachOptions {
        AttachOptions {
            file_name: options.file_name.or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            }),
            content_type: options
                .content_type
                .or_else(|| Some(file_mime_type(path, bytes, self.sniffer.as_ref()))),
        }
    }

    // ----- delivery -----

    pub fn enable_async(&mut self) -> &mut Self {
        self.is_async = true;
        self
    }

    pub fn disable_async(&mut self) -> &mut Self {
        self.is_async = false;
        self
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Schedule delivery for a later time.
    pub fn set_send_at(&mut self, send_at: DateTime<Utc>) -> &mut Self {
        self.send_at = Some(send_at);
        self
    }

    pub fn send_at(&self) -> Option<DateTime<Utc>> {
        self.send_at
    }

    // ----- templates and merge vars -----

    /// Bind the message to a remote template.
    ///
    /// With [`MergeLanguage::Mailchimp`] `content` becomes the template
    /// content. With [`MergeLanguage::Handlebars`] it is appended to the
    /// global merge vars instead and the template content is left as is.
    pub fn set_template_data<I, K, V>(
        &mut self,
        template_name: impl Into<String>,
        content: I,
        language: MergeLanguage,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.template_name = Some(template_name.into());
        match language {
            MergeLanguage::Mailchimp => {
                self.template_content = content
                    .into_iter()
                    .map(|(name, value)| MergeVar::new(name, value))
                    .collect();
            }
            MergeLanguage::Handlebars => {
                self.add_global_merge_vars(content);
            }
        }
        self.merge_language = language;
        self
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    pub fn template_content(&self) -> &[MergeVar] {
        &self.template_content
    }

    pub fn merge_language(&self) -> MergeLanguage {
        self.merge_language
    }

    /// Append global merge vars. Names starting with `_` are skipped.
    ///
    /// Repeated calls accumulate; nothing already stored is replaced.
    pub fn add_global_merge_vars<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, content) in vars {
            let name = name.into();
            if name.starts_with('_') {
                continue;
            }
            self.global_merge_vars.push(MergeVar::new(name, content));
        }
        self
    }

    pub fn global_merge_vars(&self) -> &[MergeVar] {
        &self.global_merge_vars
    }

    pub fn set_merge_vars(&mut self, merge_vars: Vec<RecipientMergeVars>) -> &mut Self {
        self.merge_vars = merge_vars;
        self
    }

    pub fn merge_vars(&self) -> &[RecipientMergeVars] {
        &self.merge_vars
    }

    // ----- metadata and tracking -----

    pub fn set_metadata(&mut self, metadata: Map<String, Value>) -> &mut Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn set_recipient_metadata(&mut self, metadata: Vec<RecipientMetadata>) -> &mut Self {
        self.recipient_metadata = metadata;
        self
    }

    pub fn recipient_metadata(&self) -> &[RecipientMetadata] {
        &self.recipient_metadata
    }

    pub fn set_google_analytics_domains<I, S>(&mut self, domains: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.google_analytics_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn google_analytics_domains(&self) -> &[String] {
        &self.google_analytics_domains
    }

    pub fn set_google_analytics_campaign(&mut self, campaign: impl Into<String>) -> &mut Self {
        self.google_analytics_campaign = Some(campaign.into());
        self
    }

    pub fn google_analytics_campaign(&self) -> Option<&str> {
        self.google_analytics_campaign.as_deref()
    }

    pub fn set_subaccount(&mut self, subaccount: impl Into<String>) -> &mut Self {
        self.subaccount = Some(subaccount.into());
        self
    }

    pub fn subaccount(&self) -> Option<&str> {
        self.subaccount.as_deref()
    }

    pub fn set_as_important(&mut self) -> &mut Self {
        self.important = true;
        self
    }

    pub fn set_as_not_important(&mut self) -> &mut Self {
        self.important = false;
        self
    }

    pub fn is_important(&self) -> bool {
        self.important
    }

    pub fn enable_opens_tracking(&mut self) -> &mut Self {
        self.track_opens = true;
        self
    }

    pub fn disable_opens_tracking(&mut self) -> &mut Self {
        self.track_opens = false;
        self
    }

    pub fn are_opens_tracked(&self) -> bool {
        self.track_opens
    }

    pub fn enable_clicks_tracking(&mut self) -> &mut Self {
        self.track_clicks = true;
        self
    }

    pub fn disable_clicks_tracking(&mut self) -> &mut Self {
        self.track_clicks = false;
        self
    }

    pub fn are_clicks_tracked(&self) -> bool {
        self.track_clicks
    }

    // ----- serialization -----

    /// To, Cc and Bcc flattened in that order, each in insertion order.
    pub fn all_recipients(&self) -> Vec<WireRecipient> {
        [
            (&self.to, RecipientType::To),
            (&self.cc, RecipientType::Cc),
            (&self.bcc, RecipientType::Bcc),
        ]
        .into_iter()
        .flat_map(|(book, kind)| {
            book.iter().map(move |entry| WireRecipient {
                email: entry.address.clone(),
                name: entry.name.clone(),
                kind,
            })
        })
        .collect()
    }

    /// Build the `message` record sent to the remote API.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            headers: Headers {
                reply_to: self.reply_to.header_value(),
            },
            html: self.html.clone(),
            text: self.text.clone(),
            subject: self.subject.clone(),
            from_email: self.from_address().map(str::to_string),
            from_name: self.from_name().map(str::to_string),
            to: self.all_recipients(),
            track_opens: self.track_opens,
            track_clicks: self.track_clicks,
            tags: self.tags.clone(),
            merge_language: self.merge_language,
            global_merge_vars: self.global_merge_vars.clone(),
            merge_vars: self.merge_vars.clone(),
            metadata: self.metadata.clone(),
            recipient_metadata: self.recipient_metadata.clone(),
            google_analytics_domains: self.google_analytics_domains.clone(),
            google_analytics_campaign: self.google_analytics_campaign.clone(),
            attachments: self.attachments.clone(),
            images: self.images.clone(),
            subaccount: self.subaccount.clone(),
            important: self.important,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn join_book(book: &AddressBook) -> String {
    book.iter()
        .map(|entry| entry.display())
        .collect::<Vec<_>>()
        .join("; ")
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Recipients: [TO] {} [CC] {} [BCC] {}",
            self.subject.as_deref().unwrap_or_default(),
            join_book(&self.to),
            join_book(&self.cc),
            join_book(&self.bcc)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressEntry;
    use serde_json::json;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";
    const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

    fn message() -> Message {
        Message::new(SenderDefaults::new("My Application", "admin@example.com"))
    }

    #[test]
    fn test_tags() {
        let mut m = message();
        m.add_tag("tag1")
            .add_tags(["tag1", "tag2", "tag3"])
            .add_tag("_tag5")
            .add_tag(&"x".repeat(51))
            .add_tag("");
        assert_eq!(m.tags(), ["tag1", "tag2", "tag3"]);
    }

    #[test]
    fn test_tag_at_length_limit_is_kept() {
        let mut m = message();
        let tag = "x".repeat(MAX_TAG_LEN);
        m.add_tag(&tag);
        assert_eq!(m.tags(), [tag]);
    }

    #[test]
    fn test_async_toggle() {
        let mut m = message();
        assert!(!m.is_async());
        assert!(m.enable_async().is_async());
        assert!(!m.disable_async().is_async());
    }

    #[test]
    fn test_template_data_mailchimp() {
        let mut m = message();
        m.set_template_data("viewName", [("money", 300)], MergeLanguage::Mailchimp);
        assert_eq!(m.template_name(), Some("viewName"));
        assert_eq!(m.template_content(), [MergeVar::new("money", 300)]);
        assert!(m.global_merge_vars().is_empty());
        assert_eq!(m.to_wire().merge_language, MergeLanguage::Mailchimp);
    }

    #[test]
    fn test_template_data_handlebars() {
        let mut m = message();
        m.set_template_data("viewName", [("money", 300)], MergeLanguage::Handlebars);
        assert_eq!(m.template_name(), Some("viewName"));
        assert!(m.template_content().is_empty());
        assert_eq!(m.global_merge_vars(), [MergeVar::new("money", 300)]);
        let wire = serde_json::to_value(m.to_wire()).unwrap();
        assert_eq!(wire["merge_language"], "handlebars");
    }

    #[test]
    fn test_recipients() {
        let mut m = message();
        m.set_to("email@email.it").set_to(vec![
            AddressEntry::named("email2@email.it", "fakeuser"),
            AddressEntry::new("email@email.it"),
            AddressEntry::new("email3@email.it"),
            AddressEntry::new("asdf"),
            AddressEntry::named("fakeuser", "email4@email.it"),
        ]);
        assert_eq!(m.to().len(), 3);
        assert!(m.to().contains("email@email.it"));
        assert!(m.to().contains("email2@email.it"));
        assert!(m.to().contains("email3@email.it"));
        assert!(m.cc().is_empty());
    }

    #[test]
    fn test_sender() {
        let mut m = message();
        assert_eq!(m.from().as_deref(), Some("My Application<admin@example.com>"));
        m.set_from("email@email.it");
        assert_eq!(m.from().as_deref(), Some("My Application<email@email.it>"));
        m.set_from("asdf");
        assert_eq!(m.from().as_deref(), Some("My Application<email@email.it>"));
        m.set_from_named("fakeuser", "email4@email.it");
        assert_eq!(m.from().as_deref(), Some("My Application<email@email.it>"));
        m.set_from_named("email2@email.it", "fakeuser");
        assert_eq!(m.from().as_deref(), Some("fakeuser<email2@email.it>"));
        m.set_from_named("email3@email.it", "   ");
        assert_eq!(m.from().as_deref(), Some("My Application<email3@email.it>"));
        m.set_from("email@email.it");
        assert_eq!(m.from().as_deref(), Some("My Application<email@email.it>"));
    }

    #[test]
    fn test_sender_name_is_trimmed() {
        let mut m = message();
        m.set_from_named("a@example.com", "  Alice  ");
        assert_eq!(m.from_name(), Some("Alice"));
    }

    #[test]
    fn test_sender_without_address() {
        let mut m = Message::new(SenderDefaults::new("My Application", ""));
        assert_eq!(m.from().as_deref(), Some("My Application"));
        m.enable_template_defaults();
        assert_eq!(m.from(), None);
    }

    #[test]
    fn test_template_defaults() {
        let mut m = message();
        m.enable_template_defaults();
        assert_eq!(m.from(), None);
        m.disable_template_defaults().set_from("email@email.it");
        assert_eq!(m.from().as_deref(), Some("My Application<email@email.it>"));
        m.enable_template_defaults();
        assert_eq!(m.from().as_deref(), Some("email@email.it"));
        m.disable_template_defaults()
            .set_from_named("email2@email.it", "fakeuser");
        assert_eq!(m.from().as_deref(), Some("fakeuser<email2@email.it>"));
        m.enable_template_defaults();
        assert_eq!(m.from().as_deref(), Some("fakeuser<email2@email.it>"));
    }

    #[test]
    fn test_subject_is_trimmed_verbatim() {
        let mut m = message();
        m.set_subject("    <a>Testo ");
        assert_eq!(m.subject(), Some("<a>Testo"));
    }

    #[test]
    fn test_bodies_are_stored_verbatim() {
        let mut m = message();
        m.set_text_body("testo")
            .set_html_body("<a>testo</a><p>more</p>");
        assert_eq!(m.text_body(), Some("testo"));
        assert_eq!(m.html_body(), Some("<a>testo</a><p>more</p>"));
    }

    #[test]
    fn test_attach_content_naming_and_types() {
        let mut m = message();
        m.attach_content(PDF, AttachOptions::new())
            .attach_content(b"", AttachOptions::new())
            .attach_content(
                PDF,
                AttachOptions::new().file_name("12.txt").content_type("image/png"),
            )
            .attach_content(b"plain text", AttachOptions::new());
        let attachments = m.attachments();
        assert_eq!(attachments.len(), 3);
        assert_eq!(attachments[0].name, "file_0");
        assert_eq!(attachments[0].mime_type, "application/pdf");
        assert_eq!(attachments[1].name, "12.txt");
        assert_eq!(attachments[1].mime_type, "image/png");
        assert_eq!(attachments[2].name, "file_2");
        assert_eq!(attachments[2].mime_type, "text/plain");
    }

    #[test]
    fn test_embed_content_requires_image() {
        let mut m = message();
        m.embed_content(b"ancora un po", AttachOptions::new())
            .embed_content(PDF, AttachOptions::new().content_type("image/png"))
            .embed_content(PNG, AttachOptions::new())
            .embed_content(
                PNG,
                AttachOptions::new().file_name("12.txt").content_type("text/html"),
            );
        let images = m.embedded_content();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name, "file_0");
        assert_eq!(images[0].mime_type, "image/png");
        assert_eq!(images[1].name, "12.txt");
        assert_eq!(images[1].mime_type, "text/html");
    }

    #[test]
    fn test_attachments_and_images_number_independently() {
        let mut m = message();
        m.attach_content(PDF, AttachOptions::new())
            .attach_content(PDF, AttachOptions::new())
            .embed_content(PNG, AttachOptions::new());
        assert_eq!(m.attachments()[1].name, "file_1");
        assert_eq!(m.embedded_content()[0].name, "file_0");
    }

    #[test]
    fn test_global_merge_vars_accumulate() {
        let mut m = message();
        m.add_global_merge_vars([("var", "value")])
            .add_global_merge_vars([("_illegal", "value")])
            .add_global_merge_vars([("var2", "value2"), ("var3", "value3")]);
        assert_eq!(
            m.global_merge_vars(),
            [
                MergeVar::new("var", "value"),
                MergeVar::new("var2", "value2"),
                MergeVar::new("var3", "value3"),
            ]
        );
    }

    #[test]
    fn test_toggles() {
        let mut m = message();
        assert!(m.are_opens_tracked() && m.are_clicks_tracked());
        assert!(!m.is_important());
        m.disable_opens_tracking()
            .disable_clicks_tracking()
            .set_as_important()
            .set_subaccount("sub-1");
        let wire = m.to_wire();
        assert!(!wire.track_opens);
        assert!(!wire.track_clicks);
        assert!(wire.important);
        assert_eq!(wire.subaccount.as_deref(), Some("sub-1"));
        m.enable_opens_tracking().set_as_not_important();
        assert!(m.are_opens_tracked());
        assert!(!m.is_important());
    }

    fn full_message() -> Message {
        let mut m = message();
        m.add_tag("tag1")
            .set_to("to@email.it")
            .set_from("from@email.it")
            .set_reply_to(vec![
                AddressEntry::new("reply@email.it"),
                AddressEntry::named("reply2@email.it", "user"),
            ])
            .set_cc("cc@email.it")
            .set_bcc("bcc@email.it")
            .set_subject("    <a>Testo ")
            .add_global_merge_vars([("var1", "value1")])
            .set_text_body("testo")
            .set_html_body("<a>testo</a>")
            .attach_content(
                PDF,
                AttachOptions::new().file_name("12.txt").content_type("image/png"),
            )
            .embed_content(PNG, AttachOptions::new().file_name("test.png"));
        m
    }

    #[test]
    fn test_wire_payload() {
        let mut m = full_message();
        let wire = serde_json::to_value(m.to_wire()).unwrap();
        assert_eq!(wire["headers"]["Reply-To"], "reply@email.it;user <reply2@email.it>");
        assert_eq!(wire["html"], "<a>testo</a>");
        assert_eq!(wire["text"], "testo");
        assert_eq!(wire["subject"], "<a>Testo");
        assert_eq!(wire["from_email"], "from@email.it");
        assert_eq!(wire["from_name"], "My Application");
        assert_eq!(wire["global_merge_vars"], json!([{"name": "var1", "content": "value1"}]));
        assert_eq!(
            wire["to"],
            json!([
                {"email": "to@email.it", "name": null, "type": "to"},
                {"email": "cc@email.it", "name": null, "type": "cc"},
                {"email": "bcc@email.it", "name": null, "type": "bcc"},
            ])
        );
        assert_eq!(wire["track_opens"], true);
        assert_eq!(wire["track_clicks"], true);
        assert_eq!(wire["tags"], json!(["tag1"]));
        assert_eq!(wire["attachments"][0]["name"], "12.txt");
        assert_eq!(wire["attachments"][0]["type"], "image/png");
        assert_eq!(wire["images"][0]["name"], "test.png");
        assert_eq!(wire["images"][0]["type"], "image/png");
        assert_eq!(wire["important"], false);
        assert_eq!(wire["subaccount"], Value::Null);

        m.enable_template_defaults();
        let wire = m.to_wire();
        assert_eq!(wire.from_email.as_deref(), Some("from@email.it"));
        assert_eq!(wire.from_name, None);
    }

    #[test]
    fn test_wire_payload_is_idempotent() {
        let m = full_message();
        assert_eq!(m.to_wire(), m.to_wire());
    }

    #[test]
    fn test_display() {
        let mut m = message();
        m.add_tag("tag1")
            .set_to("to@email.it")
            .set_from("from@email.it")
            .set_cc("cc@email.it")
            .set_bcc("bcc@email.it")
            .set_subject("My Message");
        assert_eq!(
            m.to_string(),
            "My Message - Recipients: [TO] to@email.it [CC] cc@email.it [BCC] bcc@email.it"
        );
    }
}
