use std::collections::HashMap;

use crate::license::LicenseType;

/// A well-known license body cited by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlLicense {
    pub license_type: LicenseType,
    pub body: String,
}

/// Static `(URL, version) -> license` table.
///
/// URLs compare without scheme, `www.` prefix, trailing slash, or case. An
/// entry registered without a version answers for every version.
#[derive(Debug, Clone, Default)]
pub struct UrlTable {
    entries: HashMap<(String, Option<String>), UrlLicense>,
}

impl UrlTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for url in [
            "opensource.org/licenses/MIT",
            "opensource.org/licenses/mit-license.php",
            "www.opensource.org/licenses/mit-license",
        ] {
            table.insert(url, None, LicenseType::Mit, MIT);
        }
        for url in [
            "opensource.org/licenses/BSD-3-Clause",
            "opensource.org/licenses/bsd-license.php",
        ] {
            table.insert(url, None, LicenseType::Bsd, BSD_3_CLAUSE);
        }
        for url in [
            "www.apache.org/licenses/LICENSE-2.0",
            "www.apache.org/licenses/LICENSE-2.0.txt",
            "www.apache.org/licenses/LICENSE-2.0.html",
        ] {
            table.insert(url, None, LicenseType::Apache, APACHE_2);
        }
        for url in [
            "www.gnu.org/licenses/gpl.html",
            "www.gnu.org/licenses/gpl-3.0.html",
            "www.gnu.org/licenses/old-licenses/gpl-2.0.html",
        ] {
            table.insert(url, None, LicenseType::Gpl, GPL);
        }
        table
    }

    pub fn insert(
        &mut self,
        url: &str,
        version: Option<&str>,
        license_type: LicenseType,
        body: &str,
    ) {
        self.entries.insert(
            (url_key(url), version.map(str::to_string)),
            UrlLicense {
                license_type,
                body: body.to_string(),
            },
        );
    }

    pub fn lookup(&self, url: &str, version: Option<&str>) -> Option<&UrlLicense> {
        let key = url_key(url);
        version
            .and_then(|v| self.entries.get(&(key.clone(), Some(v.to_string()))))
            .or_else(|| self.entries.get(&(key, None)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn url_key(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let mut key = lowered.as_str();
    for scheme in ["https://", "http://"] {
        key = key.strip_prefix(scheme).unwrap_or(key);
    }
    key = key.strip_prefix("www.").unwrap_or(key);
    key.trim_end_matches('/').to_string()
}

const MIT: &str = "Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in
all copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
THE SOFTWARE.";

const BSD_3_CLAUSE: &str = "Redistribution and use in source and binary forms, with or without
modification, are permitted provided that the following conditions are met:

1. Redistributions of source code must retain the above copyright notice,
   this list of conditions and the following disclaimer.

2. Redistributions in binary form must reproduce the above copyright notice,
   this list of conditions and the following disclaimer in the documentation
   and/or other materials provided with the distribution.

3. Neither the name of the copyright holder nor the names of its
   contributors may be used to endorse or promote products derived from this
   software without specific prior written permission.

THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS \"AS IS\"
AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
POSSIBILITY OF SUCH DAMAGE.";

const APACHE_2: &str = "Licensed under the Apache License, Version 2.0 (the \"License\");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an \"AS IS\" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.";

const GPL: &str = "This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_key() {
        assert_eq!(
            url_key("https://www.Apache.org/licenses/LICENSE-2.0/"),
            "apache.org/licenses/license-2.0"
        );
        assert_eq!(url_key("http://opensource.org/licenses/MIT"), "opensource.org/licenses/mit");
    }

    #[test]
    fn test_lookup_versions() {
        let mut table = UrlTable::new();
        table.insert("example.org/l", None, LicenseType::Mit, "any");
        table.insert("example.org/l", Some("2"), LicenseType::Bsd, "two");
        assert_eq!(table.lookup("http://example.org/l", Some("2")).unwrap().body, "two");
        assert_eq!(table.lookup("http://example.org/l", Some("3")).unwrap().body, "any");
        assert_eq!(table.lookup("http://example.org/l", None).unwrap().body, "any");
        assert!(table.lookup("http://example.org/other", None).is_none());
    }

    #[test]
    fn test_builtin_has_common_licenses() {
        let table = UrlTable::builtin();
        let apache = table
            .lookup("http://www.apache.org/licenses/LICENSE-2.0", Some("2.0"))
            .unwrap();
        assert_eq!(apache.license_type, LicenseType::Apache);
        let mit = table.lookup("https://opensource.org/licenses/MIT", None).unwrap();
        assert_eq!(mit.license_type, LicenseType::Mit);
    }
}
