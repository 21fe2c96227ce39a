//! vCard 3.0 serializer.
//!
//! Emits CRLF line endings. By default values are written verbatim and lines
//! are never folded, which is what deployed contact-book clients have been
//! receiving; RFC 2426 escaping and 75-octet folding are opt-in.

use std::borrow::Cow;

use cardcraft_core::record::ContactRecord;

use crate::photo::PhotoDataUrl;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Controls what the serializer emits.
///
/// `Default` gives the full card: photo included, no escaping, no folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
  /// Emit the `PHOTO` line when the record carries a valid data URL. Turn off
  /// for QR payloads, where the image would make the code unscannable.
  pub include_photo: bool,
  /// Escape `\`, `,`, `;` and newlines in TEXT values (RFC 2426 §4). Changes
  /// output for values containing those characters.
  pub escape_text:   bool,
  /// Fold content lines longer than 75 octets.
  pub fold_lines:    bool,
}

impl Default for SerializeOptions {
  fn default() -> Self {
    Self { include_photo: true, escape_text: false, fold_lines: false }
  }
}

impl SerializeOptions {
  /// Options for a QR-code payload: everything default except the photo.
  pub fn qr() -> Self {
    Self { include_photo: false, ..Self::default() }
  }
}

// ─── RFC 2425 line folding ───────────────────────────────────────────────────

/// Emit `s` as one logical line, folding at 75 octets with CRLF + SP continuation.
pub(crate) fn fold_line(s: &str) -> String {
  if s.len() <= 75 {
    return format!("{s}\r\n");
  }

  let mut result = String::with_capacity(s.len() + s.len() / 37 + 2);
  let total = s.len();
  let mut pos = 0usize;
  let mut first = true;

  while pos < total {
    let limit = if first { 75 } else { 74 };
    let end = if pos + limit >= total {
      total
    } else {
      // Walk back to the nearest valid UTF-8 char boundary
      let mut e = pos + limit;
      while e > pos && !s.is_char_boundary(e) {
        e -= 1;
      }
      // Guarantee at least one byte per segment
      if e == pos { pos + 1 } else { e }
    };

    if !first {
      result.push(' ');
    }
    result.push_str(&s[pos..end]);
    result.push_str("\r\n");
    pos = end;
    first = false;
  }

  result
}

// ─── Value escaping ──────────────────────────────────────────────────────────

/// Escape a full TEXT value: `\`, `,`, `;`, `\n`.
fn escape_value(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(',', "\\,")
    .replace(';', "\\;")
    .replace("\r\n", "\\n")
    .replace('\n', "\\n")
}

/// Escape a semicolon-delimited component (N / ADR field): `\`, `;`, `\n`.
/// Commas are list separators within a component and are left alone.
fn escape_component(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(';', "\\;")
    .replace("\r\n", "\\n")
    .replace('\n', "\\n")
}

// ─── Writer ──────────────────────────────────────────────────────────────────

struct Writer {
  out:     String,
  options: SerializeOptions,
}

impl Writer {
  fn new(options: SerializeOptions) -> Self {
    Self { out: String::new(), options }
  }

  fn line(&mut self, line: &str) {
    if self.options.fold_lines {
      self.out.push_str(&fold_line(line));
    } else {
      self.out.push_str(line);
      self.out.push_str("\r\n");
    }
  }

  /// `NAME:value` when `value` is non-empty, escaping as TEXT if enabled.
  fn text(&mut self, name: &str, value: &str) {
    if !value.is_empty() {
      let value = self.value(value);
      self.line(&format!("{name}:{value}"));
    }
  }

  /// `NAME:value` when `value` is non-empty, never escaped.
  fn verbatim(&mut self, name: &str, value: &str) {
    if !value.is_empty() {
      self.line(&format!("{name}:{value}"));
    }
  }

  fn value<'a>(&self, s: &'a str) -> Cow<'a, str> {
    if self.options.escape_text { Cow::Owned(escape_value(s)) } else { Cow::Borrowed(s) }
  }

  fn component<'a>(&self, s: &'a str) -> Cow<'a, str> {
    if self.options.escape_text { Cow::Owned(escape_component(s)) } else { Cow::Borrowed(s) }
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Serialize `record` as a vCard 3.0 string.
///
/// Never fails: empty fields are skipped, a record with no name gets no
/// `N`/`FN` lines, and a photo that is not a base64 image data URL is dropped.
/// The result always starts with `BEGIN:VCARD` and ends with `END:VCARD\r\n`.
pub fn serialize(record: &ContactRecord, options: &SerializeOptions) -> String {
  let mut w = Writer::new(*options);

  w.line("BEGIN:VCARD");
  w.line("VERSION:3.0");

  if record.is_nameable() {
    let family = w.component(&record.last_name);
    let given = w.component(&record.first_name);
    let n = format!("N:{family};{given};;;");
    w.line(&n);

    // FN always accompanies N, even when the trimmed name is empty.
    let full = format!("{} {}", record.first_name, record.last_name);
    let full = w.value(full.trim()).into_owned();
    w.line(&format!("FN:{full}"));
  }

  w.text("ORG", &record.organization);
  w.text("TITLE", &record.title);

  w.verbatim("TEL;TYPE=CELL", &record.phone_mobile);
  w.verbatim("TEL;TYPE=WORK", &record.phone_work);
  w.verbatim("TEL;TYPE=FAX", &record.phone_fax);

  w.verbatim("EMAIL;TYPE=INTERNET,PREF", &record.email_primary);
  w.verbatim("EMAIL;TYPE=INTERNET", &record.email_secondary);

  w.verbatim("URL", &record.website);
  w.verbatim("X-SOCIALPROFILE;TYPE=linkedin", &record.linkedin);
  w.verbatim("X-SOCIALPROFILE;TYPE=twitter", &record.twitter);

  if record.has_address() {
    let adr = format!(
      "ADR;TYPE=WORK:;;{};{};{};{};{}",
      w.component(&record.address_street),
      w.component(&record.address_city),
      w.component(&record.address_state),
      w.component(&record.address_zip),
      w.component(&record.address_country),
    );
    w.line(&adr);
  }

  if options.include_photo
    && let Some(photo) = record.photo().and_then(PhotoDataUrl::parse)
  {
    let line = format!("PHOTO;ENCODING=b;TYPE={}:{}", photo.vcard_type(), photo.payload());
    w.line(&line);
  }

  w.line("END:VCARD");
  w.out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn full_record() -> ContactRecord {
    ContactRecord {
      photo:           Some("data:image/jpeg;base64,/9j/AAAA".into()),
      first_name:      "Jane".into(),
      last_name:       "Smith".into(),
      title:           "Director".into(),
      organization:    "Acme".into(),
      phone_mobile:    "+1 555 0100".into(),
      phone_work:      "+1 555 0101".into(),
      phone_fax:       "+1 555 0102".into(),
      email_primary:   "jane@acme.test".into(),
      email_secondary: "jane@home.test".into(),
      website:         "https://acme.test".into(),
      linkedin:        "https://linkedin.com/in/jane".into(),
      twitter:         "https://twitter.com/jane".into(),
      address_street:  "1 Main St".into(),
      address_city:    "Springfield".into(),
      address_state:   "IL".into(),
      address_zip:     "62701".into(),
      address_country: "USA".into(),
    }
  }

  fn named(first: &str, last: &str) -> ContactRecord {
    ContactRecord {
      first_name: first.into(),
      last_name:  last.into(),
      ..Default::default()
    }
  }

  fn render(record: &ContactRecord) -> String {
    serialize(record, &SerializeOptions::default())
  }

  // ── Envelope ────────────────────────────────────────────────────────────────

  #[test]
  fn empty_record_is_bare_skeleton() {
    let out = render(&ContactRecord::default());
    assert_eq!(out, "BEGIN:VCARD\r\nVERSION:3.0\r\nEND:VCARD\r\n");
  }

  #[test]
  fn envelope_holds_for_every_shape() {
    let records = [
      ContactRecord::default(),
      named("John", ""),
      full_record(),
      ContactRecord { photo: Some("garbage".into()), ..Default::default() },
    ];
    for r in &records {
      let out = render(r);
      assert!(out.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"), "got:\n{out}");
      assert!(out.ends_with("\r\nEND:VCARD\r\n"), "got:\n{out}");
      let last_line = out.split("\r\n").last();
      assert_eq!(last_line, Some(""));
    }
  }

  // ── Name ────────────────────────────────────────────────────────────────────

  #[test]
  fn name_only_emits_n_then_fn() {
    let out = render(&named("John", "Doe"));
    assert_eq!(
      out,
      "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;John;;;\r\nFN:John Doe\r\nEND:VCARD\r\n"
    );
  }

  #[test]
  fn missing_last_name_leaves_no_trailing_space() {
    let out = render(&named("John", ""));
    assert!(out.contains("\r\nN:;John;;;\r\n"), "got:\n{out}");
    assert!(out.contains("\r\nFN:John\r\n"), "got:\n{out}");
  }

  #[test]
  fn missing_first_name_leaves_no_leading_space() {
    let out = render(&named("", "Doe"));
    assert!(out.contains("\r\nN:Doe;;;;\r\n"), "got:\n{out}");
    assert!(out.contains("\r\nFN:Doe\r\n"), "got:\n{out}");
  }

  #[test]
  fn whitespace_name_still_emits_fn() {
    let out = render(&named(" ", ""));
    assert_eq!(
      out,
      "BEGIN:VCARD\r\nVERSION:3.0\r\nN:; ;;;\r\nFN:\r\nEND:VCARD\r\n"
    );
  }

  #[test]
  fn no_name_means_no_name_lines() {
    let r = ContactRecord { organization: "Acme".into(), ..Default::default() };
    let out = render(&r);
    assert!(!out.contains("\r\nN:"), "got:\n{out}");
    assert!(!out.contains("FN:"), "got:\n{out}");
    assert!(out.contains("\r\nORG:Acme\r\n"));
  }

  // ── Scalars ─────────────────────────────────────────────────────────────────

  #[test]
  fn whitespace_only_value_is_emitted_verbatim() {
    let r = ContactRecord { title: "  ".into(), ..Default::default() };
    assert!(render(&r).contains("\r\nTITLE:  \r\n"));
  }

  #[test]
  fn each_scalar_maps_to_its_line() {
    let out = render(&full_record());
    for expected in [
      "ORG:Acme",
      "TITLE:Director",
      "TEL;TYPE=CELL:+1 555 0100",
      "TEL;TYPE=WORK:+1 555 0101",
      "TEL;TYPE=FAX:+1 555 0102",
      "EMAIL;TYPE=INTERNET,PREF:jane@acme.test",
      "EMAIL;TYPE=INTERNET:jane@home.test",
      "URL:https://acme.test",
      "X-SOCIALPROFILE;TYPE=linkedin:https://linkedin.com/in/jane",
      "X-SOCIALPROFILE;TYPE=twitter:https://twitter.com/jane",
    ] {
      assert!(out.contains(&format!("\r\n{expected}\r\n")), "missing {expected} in:\n{out}");
    }
  }

  #[test]
  fn lines_follow_fixed_order() {
    let out = render(&full_record());
    let lines: Vec<&str> = out.split("\r\n").collect();
    let index_of = |prefix: &str| {
      lines
        .iter()
        .position(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix} in:\n{out}"))
    };

    let order = [
      "BEGIN:VCARD",
      "VERSION:3.0",
      "N:",
      "FN:",
      "ORG:",
      "TITLE:",
      "TEL;TYPE=CELL:",
      "TEL;TYPE=WORK:",
      "TEL;TYPE=FAX:",
      "EMAIL;TYPE=INTERNET,PREF:",
      "EMAIL;TYPE=INTERNET:",
      "URL:",
      "X-SOCIALPROFILE;TYPE=linkedin:",
      "X-SOCIALPROFILE;TYPE=twitter:",
      "ADR;TYPE=WORK:",
      "PHOTO;",
      "END:VCARD",
    ];
    let indices: Vec<usize> = order.iter().copied().map(|p| index_of(p)).collect();
    for (i, pair) in indices.windows(2).enumerate() {
      assert_eq!(pair[1], pair[0] + 1, "{} should directly follow {}", order[i + 1], order[i]);
    }
  }

  // ── Address ─────────────────────────────────────────────────────────────────

  #[test]
  fn partial_address_keeps_all_positions() {
    let r = ContactRecord {
      address_street: "123 Main St".into(),
      address_city:   "NYC".into(),
      ..Default::default()
    };
    let out = render(&r);
    assert_eq!(out.matches("ADR").count(), 1);
    assert!(out.contains("\r\nADR;TYPE=WORK:;;123 Main St;NYC;;;\r\n"), "got:\n{out}");
  }

  #[test]
  fn country_alone_triggers_address() {
    let r = ContactRecord { address_country: "NZ".into(), ..Default::default() };
    assert!(render(&r).contains("\r\nADR;TYPE=WORK:;;;;;;NZ\r\n"));
  }

  // ── Photo ───────────────────────────────────────────────────────────────────

  #[test]
  fn photo_included_by_default() {
    let r = ContactRecord { photo: Some("data:image/png;base64,AAAA".into()), ..Default::default() };
    assert!(render(&r).contains("\r\nPHOTO;ENCODING=b;TYPE=PNG:AAAA\r\n"));
  }

  #[test]
  fn photo_excluded_changes_nothing_else() {
    let r = full_record();
    let with = serialize(&r, &SerializeOptions::default());
    let without = serialize(&r, &SerializeOptions::qr());
    assert!(!without.contains("PHOTO"));

    let stripped: Vec<&str> =
      with.split("\r\n").filter(|l| !l.starts_with("PHOTO;")).collect();
    assert_eq!(stripped.join("\r\n"), without);
  }

  #[test]
  fn malformed_photo_is_skipped() {
    let r = ContactRecord { photo: Some("data:image/png,AAAA".into()), ..named("A", "B") };
    let out = render(&r);
    assert!(!out.contains("PHOTO"));
    assert_eq!(out, render(&named("A", "B")));
  }

  // ── Determinism ─────────────────────────────────────────────────────────────

  #[test]
  fn serializing_twice_is_identical() {
    let r = full_record();
    assert_eq!(render(&r), render(&r));
  }

  #[test]
  fn values_are_unescaped_by_default() {
    let r = ContactRecord {
      organization:   "Smith, Jones; Partners".into(),
      address_street: "Suite 4; Floor 2".into(),
      ..Default::default()
    };
    let out = render(&r);
    assert!(out.contains("\r\nORG:Smith, Jones; Partners\r\n"), "got:\n{out}");
    assert!(out.contains(";;Suite 4; Floor 2;"), "got:\n{out}");
  }

  // ── Opt-in escaping ─────────────────────────────────────────────────────────

  #[test]
  fn escaping_applies_to_text_values() {
    let r = ContactRecord {
      first_name:     "Jo;hn".into(),
      last_name:      "Do,e".into(),
      organization:   "Smith, Jones; Partners".into(),
      title:          "Line one\nLine two".into(),
      address_street: "Suite 4; Floor 2".into(),
      website:        "https://x.test/a,b;c".into(),
      ..Default::default()
    };
    let opts = SerializeOptions { escape_text: true, ..Default::default() };
    let out = serialize(&r, &opts);
    assert!(out.contains("\r\nN:Do,e;Jo\\;hn;;;\r\n"), "got:\n{out}");
    assert!(out.contains("\r\nFN:Jo\\;hn Do\\,e\r\n"), "got:\n{out}");
    assert!(out.contains("\r\nORG:Smith\\, Jones\\; Partners\r\n"), "got:\n{out}");
    assert!(out.contains("\r\nTITLE:Line one\\nLine two\r\n"), "got:\n{out}");
    assert!(out.contains(":;;Suite 4\\; Floor 2;;;;\r\n"), "got:\n{out}");
    assert!(out.contains("\r\nURL:https://x.test/a,b;c\r\n"), "got:\n{out}");
  }

  #[test]
  fn escaping_is_noop_for_plain_values() {
    let r = full_record();
    let opts = SerializeOptions { escape_text: true, ..Default::default() };
    assert_eq!(serialize(&r, &opts), render(&r));
  }

  // ── Opt-in folding ──────────────────────────────────────────────────────────

  #[test]
  fn folding_bounds_physical_lines() {
    let r = ContactRecord {
      photo: Some(format!("data:image/png;base64,{}", "A".repeat(400))),
      ..named("John", "Doe")
    };
    let opts = SerializeOptions { fold_lines: true, ..Default::default() };
    let out = serialize(&r, &opts);
    for physical in out.split("\r\n").filter(|l| !l.is_empty()) {
      assert!(physical.len() <= 75, "physical line too long ({}): {physical:?}", physical.len());
    }
    let unfolded = out.replace("\r\n ", "");
    assert_eq!(unfolded, render(&r));
  }

  #[test]
  fn fold_line_respects_char_boundaries() {
    let s = format!("NOTE:{}", "é".repeat(60));
    let folded = fold_line(&s);
    assert_eq!(folded.replace("\r\n ", ""), format!("{s}\r\n"));
  }

  #[test]
  fn short_line_is_not_folded() {
    assert_eq!(fold_line("FN:John"), "FN:John\r\n");
  }
}
