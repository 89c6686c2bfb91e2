//! Text patterns each detection strategy runs, plus the URL table.
//!
//! Patterns match from the start of a line. Their named groups carry the
//! roles the strategies read:
//!
//! - `prefix`, `indent`: comment decoration shared by every line of a block
//! - `copyright`, `authors`: an inline copyright and the organisation in it
//! - `name`: a referenced license file or family ("LICENSE", "BSD")
//! - `url1`, `version1`, `url2`, …: cited license URLs
//! - `body`: the attribution text of a "thanks to" line

pub mod urls;

use regex::Regex;

use crate::config::UrlLicenseEntry;
pub use urls::{UrlLicense, UrlTable};

/// Whitespace between two words of a phrase, possibly wrapping onto a new
/// comment line.
const WS: &str = r"(?:[ \t]+|[ \t]*\n[ \t]*(?:(?://+|#+|\*|;+|--)[ \t]*)?)";

/// Decoration of the first line of a match.
const PREFIX: &str = r"(?P<prefix>[ \t]*(?://+|#+|\*|;+|--|REM)?[ \t]?)(?P<indent>[ \t]*)";

/// Decoration of a later line inside the same match.
const LEAD: &str = r"[ \t]*(?://+|#+|\*|;+|--)?[ \t]*";

/// Rest of the final line.
const EOL: &str = r"[^\n]*(?:\n|\z)";

/// An optional copyright line directly above the sentence a reference
/// pattern is anchored on.
const COPYRIGHT_LINE: &str = r"(?:(?P<copyright>(?:Copyright\b|\(c\)|©)[^\n]*)\n[ \t]*(?://+|#+|\*|;+|--)?[ \t]?[ \t]*)?";

#[derive(Debug, Clone)]
pub struct PatternCatalogue {
    /// Markers of files that carry no license of their own (generated code).
    pub no_default: Vec<Regex>,
    /// Broader markers, tried only when nothing else matched.
    pub fallback: Vec<Regex>,
    pub attributions: Vec<Regex>,
    pub file_references: Vec<Regex>,
    pub type_references: Vec<Regex>,
    pub url_references: Vec<Regex>,
    /// Full license texts; a copyright must precede them.
    pub inline_licenses: Vec<Regex>,
    /// Notices that may stand without a copyright.
    pub inline_notices: Vec<Regex>,
    pub forward_references: Vec<Regex>,
    pub urls: UrlTable,
}

impl Default for PatternCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternCatalogue {
    /// A catalogue with no patterns and an empty URL table.
    pub fn empty() -> Self {
        Self {
            no_default: Vec::new(),
            fallback: Vec::new(),
            attributions: Vec::new(),
            file_references: Vec::new(),
            type_references: Vec::new(),
            url_references: Vec::new(),
            inline_licenses: Vec::new(),
            inline_notices: Vec::new(),
            forward_references: Vec::new(),
            urls: UrlTable::new(),
        }
    }

    pub fn builtin() -> Self {
        Self {
            no_default: vec![compile(
                r"(?mi)^[^\n]*?(?:@generated\b|\bDO NOT EDIT\b|\bThis file (?:is|was) (?:automatically |auto-)?generated\b|\bAutogenerated\b)[^\n]*(?:\n|\z)",
            )],
            fallback: vec![compile(r"(?mi)^[^\n]*\blicen[cs](?:e[ds]?|ing)\b[^\n]*(?:\n|\z)")],
            attributions: vec![compile(
                r"(?mi)^[^\n\w]*(?P<body>(?:many |special )?thanks to\b[^\n]*?)[ \t]*(?:\*/|-->)?[ \t]*(?:\n|\z)",
            )],
            file_references: file_references(),
            type_references: type_references(),
            url_references: url_references(),
            inline_licenses: inline_licenses(),
            inline_notices: vec![compile(&format!(
                r"(?m)^{PREFIX}{}{WS}(?:at|by){WS}{}{EOL}",
                flex("This product includes software developed"),
                flex("The Apache Software Foundation"),
            ))],
            forward_references: forward_references(),
            urls: UrlTable::builtin(),
        }
    }

    /// Extend the URL table with configured entries.
    pub fn with_url_licenses(mut self, entries: &[UrlLicenseEntry]) -> Self {
        for entry in entries {
            self.urls.insert(
                &entry.url,
                entry.version.as_deref(),
                entry.license_type,
                &entry.body,
            );
        }
        self
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in license pattern")
}

/// An escaped phrase whose words may be separated by any whitespace,
/// including a wrap onto the next comment line.
fn flex(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(WS)
}

/// A full license text from its first words to its last.
fn block(start: &str, end: &str) -> Regex {
    compile(&format!(r"(?ms)^{PREFIX}{start}.*?{end}{EOL}"))
}

fn inline_licenses() -> Vec<Regex> {
    vec![
        block(
            &flex("Permission is hereby granted, free of charge,"),
            &flex("DEALINGS IN THE SOFTWARE."),
        ),
        block(
            &flex("Redistribution and use in source and binary forms"),
            &flex("SUCH DAMAGE."),
        ),
        block(
            &format!("{}{WS}{}", flex("Licensed under the Apache License,"), flex("Version 2.0")),
            &flex("limitations under the License."),
        ),
        block(
            &flex("This software is provided 'as-is', without any express or implied"),
            &flex("from any source distribution."),
        ),
        block(
            &format!(r"This{WS}(?:program|library|file){WS}is{WS}free{WS}software"),
            &format!(
                r"(?:<?https?://www\.gnu\.org/licenses/?>?\.?|MA{WS}0211\d-1\d{{3}},?{WS}USA\.?)"
            ),
        ),
    ]
}

fn file_references() -> Vec<Regex> {
    let file_name = r"(?P<name>LICENSE(?:\.\w+)?|COPYING(?:\.\w+)?)";
    vec![
        // Copyright 2014 The Foo Authors. All rights reserved.
        // Use of this source code is governed by a BSD-style license that can be
        // found in the LICENSE file.
        compile(&format!(
            r"(?m)^{PREFIX}(?P<copyright>Copyright\b(?:[^\n]*?(?P<authors>The [^\n]+? Authors)\b[^\n]*|[^\n]*))\n{LEAD}{}{WS}an?{WS}[\w-]+{WS}{}{WS}{file_name}{WS}file\.{EOL}",
            flex("Use of this source code is governed by"),
            flex("license that can be found in the"),
        )),
        compile(&format!(
            r"(?m)^{PREFIX}(?P<copyright>Copyright\b[^\n]*)\n{LEAD}{}{WS}{file_name}{WS}file\.{EOL}",
            flex("Licensed under the license found in the"),
        )),
        compile(&format!(
            r"(?mi)^{PREFIX}See{WS}(?:the{WS})?{file_name}{WS}file\b{EOL}"
        )),
    ]
}

fn type_references() -> Vec<Regex> {
    vec![compile(&format!(
        r"(?m)^{PREFIX}(?:This{WS}(?:file|software|code|library){WS}is{WS}(?:distributed|licensed|released){WS}under|{}|Licensed{WS}under){WS}(?:the{WS}|an?{WS})?(?P<name>BSD|MIT|Apache|GPL|LGPL|MPL|zlib|FreeType)(?:-style)?{WS}[Ll]icen[cs]e\.{EOL}",
        flex("Use of this source code is governed by"),
    ))]
}

fn url_references() -> Vec<Regex> {
    vec![
        compile(&format!(
            r"(?m)^{PREFIX}{COPYRIGHT_LINE}{}{WS}\((?P<url1>https?://[^\s)]+)\){WS}and{WS}GPL{WS}\((?P<url2>https?://[^\s)]+)\){WS}licenses\.{EOL}",
            flex("Dual licensed under the MIT"),
        )),
        compile(&format!(
            r"(?m)^{PREFIX}{COPYRIGHT_LINE}(?:Released|Licensed|Distributed){WS}under{WS}the{WS}[\w .-]*?[Ll]icen[cs]e(?:,?{WS}[Vv]ersion{WS}(?P<version1>\d+(?:\.\d+)*))?[^\n]*?(?P<url1>https?://[^\s)>\x22]+?)[)>\x22.,;]*[ \t]*(?:\n|\z)"
        )),
    ]
}

fn forward_references() -> Vec<Regex> {
    vec![compile(&format!(
        r"(?m)^{PREFIX}(?:This{WS}file|Modifications|Changes|Portions{WS}of{WS}this{WS}file){WS}(?:is|are){WS}(?:also{WS})?(?:licensed|distributed|released){WS}under{WS}the{WS}same{WS}(?:(?P<name>[\w-]+){WS})?(?:license|terms){WS}as{WS}(?:above|the{WS}rest{WS}of{WS}this{WS}file|the{WS}original(?:{WS}code)?)\.{EOL}"
    ))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::LicenseType;

    #[test]
    fn test_flex_wraps_comment_lines() {
        let pattern = Regex::new(&flex("SUCH DAMAGE.")).unwrap();
        assert!(pattern.is_match("SUCH DAMAGE."));
        assert!(pattern.is_match("SUCH\n// DAMAGE."));
        assert!(pattern.is_match("SUCH\n * DAMAGE."));
        assert!(!pattern.is_match("SUCHxDAMAGE."));
    }

    #[test]
    fn test_file_reference_captures() {
        let catalogue = PatternCatalogue::builtin();
        let text = "// Copyright 2014 The Foo Authors. All rights reserved.\n// Use of this source code is governed by a BSD-style license that can be\n// found in the LICENSE file.\n";
        let caps = catalogue.file_references[0].captures(text).unwrap();
        assert_eq!(&caps["authors"], "The Foo Authors");
        assert_eq!(&caps["name"], "LICENSE");
        assert_eq!(&caps["prefix"], "// ");
        assert_eq!(
            &caps["copyright"],
            "Copyright 2014 The Foo Authors. All rights reserved."
        );

        let caps = catalogue.file_references[2].captures("# See LICENSE file.\n").unwrap();
        assert_eq!(&caps["name"], "LICENSE");
    }

    #[test]
    fn test_authors_without_trailing_period() {
        let catalogue = PatternCatalogue::builtin();
        let text = "// Copyright 2013 The Chromium Authors\n// Use of this source code is governed by a BSD-style license that can be\n// found in the LICENSE file.\n";
        let caps = catalogue.file_references[0].captures(text).unwrap();
        assert_eq!(&caps["authors"], "The Chromium Authors");
        assert_eq!(&caps["copyright"], "Copyright 2013 The Chromium Authors");
    }

    #[test]
    fn test_type_reference() {
        let catalogue = PatternCatalogue::builtin();
        let caps = catalogue.type_references[0]
            .captures("// Use of this source code is governed by a BSD-style license.\n")
            .unwrap();
        assert_eq!(&caps["name"], "BSD");
        assert!(!catalogue.type_references[0]
            .is_match("// Licensed under the Apache License, Version 2.0 (the \"License\");\n"));
    }

    #[test]
    fn test_url_reference() {
        let catalogue = PatternCatalogue::builtin();
        let caps = catalogue.url_references[1]
            .captures("// Released under the MIT license: https://opensource.org/licenses/MIT.\n")
            .unwrap();
        assert_eq!(&caps["url1"], "https://opensource.org/licenses/MIT");
        assert!(caps.name("version1").is_none());

        let caps = catalogue.url_references[0]
            .captures(" * Dual licensed under the MIT (http://opensource.org/licenses/MIT)\n * and GPL (http://www.gnu.org/licenses/gpl.html) licenses.\n")
            .unwrap();
        assert_eq!(&caps["url2"], "http://www.gnu.org/licenses/gpl.html");
        assert!(caps.name("copyright").is_none());

        let text = "// Copyright 2021 Foo\n// Released under the Foo License, version 2: https://example.org/foo\n";
        let caps = catalogue.url_references[1].captures(text).unwrap();
        assert_eq!(caps.get(0).unwrap().start(), 0);
        assert_eq!(&caps["copyright"], "Copyright 2021 Foo");
        assert_eq!(&caps["version1"], "2");
    }

    #[test]
    fn test_forward_reference_name() {
        let catalogue = PatternCatalogue::builtin();
        let pattern = &catalogue.forward_references[0];
        let caps = pattern
            .captures("// This file is licensed under the same BSD license as above.\n")
            .unwrap();
        assert_eq!(&caps["name"], "BSD");
        let caps = pattern
            .captures("// Changes are distributed under the same terms as the rest of this file.\n")
            .unwrap();
        assert!(caps.name("name").is_none());
    }

    #[test]
    fn test_inline_license_spans_block() {
        let catalogue = PatternCatalogue::builtin();
        let text = "// Redistribution and use in source and binary forms, with or\n// without modification, are permitted.\n// ... SUCH\n// DAMAGE.\nint x;\n";
        let found = catalogue.inline_licenses[1].find(text).unwrap();
        assert_eq!(found.start(), 0);
        assert_eq!(&text[found.end()..], "int x;\n");
    }

    #[test]
    fn test_configured_urls() {
        let catalogue = PatternCatalogue::empty().with_url_licenses(&[UrlLicenseEntry {
            url: "https://example.org/license".to_string(),
            version: None,
            license_type: LicenseType::Unknown,
            body: "Do what you like.".to_string(),
        }]);
        assert_eq!(catalogue.urls.len(), 1);
        assert!(catalogue.urls.lookup("http://example.org/license/", None).is_some());
    }
}
