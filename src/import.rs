//! Import a raw RFC 5322 message into a [`Message`].

use std::path::Path;

use mail_parser::{MessageParser, MimeHeaders, PartType};

use crate::address::AddressEntry;
use crate::attachment::{is_image_type, AttachOptions};
use crate::error::{MailError, Result};
use crate::message::Message;

/// Copy sender, recipients, subject, bodies and attachments from `raw` into
/// `message`.
///
/// Inline image parts with a Content-ID are embedded under that ID so HTML
/// `cid:` references keep working; every other part is attached.
pub fn apply_mime(message: &mut Message, raw: &[u8]) -> Result<()> {
    let data = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| MailError::Parse("not an RFC 5322 message".to_string()))?;

    if let Some(from) = data
        .from()
        .map(|from| from.clone().into_list())
        .unwrap_or_default()
        .into_iter()
        .find(|addr| addr.address.is_some())
    {
        let address = from.address.as_deref().unwrap_or_default();
        let name = from.name.as_deref().unwrap_or_default();
        message.set_from_named(address, name);
    }

    let to = collect_entries(data.to());
    let cc = collect_entries(data.cc());
    let bcc = collect_entries(data.bcc());
    let reply_to = collect_entries(data.reply_to());
    tracing::debug!(
        target: "mandrill",
        "Importing message with {} to, {} cc, {} bcc",
        to.len(),
        cc.len(),
        bcc.len()
    );
    message
        .set_to(to)
        .set_cc(cc)
        .set_bcc(bcc)
        .set_reply_to(reply_to);

    if let Some(subject) = data.subject() {
        message.set_subject(subject);
    }
    // body_html/body_text convert between formats; only take real parts.
    if let Some(PartType::Html(html)) = data.html_part(0).map(|part| &part.body) {
        message.set_html_body(html.to_string());
    }
    if let Some(PartType::Text(text)) = data.text_part(0).map(|part| &part.body) {
        message.set_text_body(text.to_string());
    }

    for part in data.attachments() {
        let content_type = part.content_type().map(|ct| match &ct.c_subtype {
            Some(subtype) => format!("{}/{}", ct.c_type, subtype),
            None => ct.c_type.to_string(),
        });
        let mut options = AttachOptions::new();
        if let Some(content_type) = &content_type {
            options = options.content_type(content_type.as_str());
        }

        let inline_image = content_type.as_deref().map(is_image_type).unwrap_or(false);
        match part.content_id() {
            Some(cid) if inline_image => {
                let options = options.file_name(cid);
                let embedded = message.embedded_content().len();
                message.embed_content(part.contents(), options.clone());
                // Content that does not sniff as an image is kept as an attachment.
                if message.embedded_content().len() == embedded {
                    message.attach_content(part.contents(), options);
                }
            }
            _ => {
                if let Some(name) = part.attachment_name() {
                    options = options.file_name(name);
                }
                message.attach_content(part.contents(), options);
            }
        }
    }

    Ok(())
}

/// Read an `.eml` file and apply it to `message`.
pub fn apply_mime_file(message: &mut Message, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|err| MailError::io(path, err))?;
    apply_mime(message, &raw)
}

fn collect_entries(address: Option<&mail_parser::Address<'_>>) -> Vec<AddressEntry> {
    address
        .map(|list| list.clone().into_list())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|addr| {
            let email = addr.address?.to_string();
            Some(match addr.name {
                Some(name) => AddressEntry::named(email, name.to_string()),
                None => AddressEntry::new(email),
            })
        })
        .collect()
}
