//! Static documents: index page, OpenSearch descriptors, favicon.
//!
//! Everything here is rendered once at startup and served from memory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use minijinja::{Environment, Value, context};
use tracing::{info, warn};

use crate::entities::profile::{EntityTypeProfile, profiles};
use crate::error::OpenSearchError;

const LOGO_PNG_BASE64: &str = include_str!("../../assets/go-logo.png.b64");
pub const CONTACT: &str = "sjcarbon@lbl.gov";
pub const INDEX_HTML_PATH: &str = "html/index.html";

const INDEX_TEMPLATE: &str = r#"<html>
<head>
<meta charset="utf-8">
<link rel="icon" href="{{ logo }}" />
{%- for p in profiles %}
<link rel="search" type="application/opensearchdescription+xml" href="http://{{ public_host }}{{ p.descriptor_path|safe }}" title="GO Search ({{ p.readable_name }})" />
{%- endfor %}
</head>
<body>
<p>Hello, World!</p>
<p>If you know how to find it in your browser, an OpenSearch plug-in should now be available.</p>
</body>
</html>
"#;

const OSD_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OpenSearchDescription xmlns:moz="http://www.mozilla.org/2006/browser/search/" xmlns="http://a9.com/-/spec/opensearch/1.1/">
<ShortName>GO OpenSearch ({{ profile.readable_name }})</ShortName>
<Description>GO OpenSearch for {{ profile.readable_name }}s.</Description>
<Tags>example golr bbop go gene ontology {{ profile.readable_name }}</Tags>
<Contact>{{ contact }}</Contact>
<Image width="16" height="16" type="image/png">{{ logo }}</Image>
<Url type="text/html" method="GET" template="{{ search_template }}" />
<Url type="application/x-suggestions+json" template="http://{{ public_host }}/{{ profile.entity_type }}/{searchTerms}" />
<moz:SearchForm>{{ search_form }}</moz:SearchForm>
</OpenSearchDescription>
"#;

fn templates() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        // `.html` and `.xml` names turn on minijinja's markup auto-escaping.
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)
            .expect("valid index template");
        env.add_template("osd.xml", OSD_TEMPLATE)
            .expect("valid descriptor template");
        env
    })
}

pub fn logo_data_uri() -> String {
    format!("data:image/png;base64,{}", LOGO_PNG_BASE64.trim())
}

/// The bundled logo only holds base64 text, so it is inserted unescaped.
fn logo_value() -> Value {
    Value::from_safe_string(logo_data_uri())
}

pub fn render_index(public_host: &str) -> Result<String, OpenSearchError> {
    let tmpl = templates().get_template("index.html")?;
    Ok(tmpl.render(context! {
        public_host,
        logo => logo_value(),
        profiles => profiles(),
    })?)
}

pub fn render_descriptor(
    profile: &EntityTypeProfile,
    public_host: &str,
    search_template: &str,
    search_form: &str,
) -> Result<String, OpenSearchError> {
    let tmpl = templates().get_template("osd.xml")?;
    Ok(tmpl.render(context! {
        profile,
        public_host,
        search_template,
        search_form,
        contact => CONTACT,
        logo => logo_value(),
    })?)
}

#[derive(Debug, Clone, Default)]
pub struct Pages {
    pub index: String,
    pub cached_index_html: Vec<u8>,
    descriptors: HashMap<&'static str, String>,
}

impl Pages {
    pub fn render(
        public_host: &str,
        search_template: &str,
        search_form: &str,
    ) -> Result<Self, OpenSearchError> {
        let mut descriptors = HashMap::new();
        for profile in profiles() {
            descriptors.insert(
                profile.descriptor_path,
                render_descriptor(profile, public_host, search_template, search_form)?,
            );
        }
        Ok(Self {
            index: render_index(public_host)?,
            cached_index_html: Vec::new(),
            descriptors,
        })
    }

    /// Loads the on-disk index page. A missing file leaves the cache empty.
    pub async fn load_index_html(mut self, path: impl AsRef<Path>) -> Result<Self, OpenSearchError> {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                info!(path = %path.display(), bytes = bytes.len(), "cached index page");
                self.cached_index_html = bytes;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "index page not found; serving empty body");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(self)
    }

    pub fn descriptor(&self, path: &str) -> Option<&str> {
        self.descriptors.get(path).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::profile::resolve_profile;

    const SEARCH: &str = "http://amigo.test/amigo/medial_search?q={searchTerms}";

    #[test]
    fn descriptor_for_gene_product_uses_readable_name_and_route() {
        let profile = resolve_profile("gene_product").unwrap();
        let xml = render_descriptor(profile, "localhost:8910", SEARCH, "http://amigo.test/").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<ShortName>GO OpenSearch (gene product)</ShortName>"));
        assert!(xml.contains("<Description>GO OpenSearch for gene products.</Description>"));
        assert!(xml.contains(
            r#"type="application/x-suggestions+json" template="http://localhost:8910/gene_product/{searchTerms}""#
        ));
        assert!(xml.contains(
            r#"template="http:&#x2f;&#x2f;amigo.test&#x2f;amigo&#x2f;medial_search?q={searchTerms}""#
        ));
        assert!(xml.contains("<moz:SearchForm>http:&#x2f;&#x2f;amigo.test&#x2f;</moz:SearchForm>"));
        assert!(xml.contains("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn descriptor_escapes_markup_in_urls() {
        let profile = resolve_profile("term").unwrap();
        let xml = render_descriptor(profile, "h<1>", "?x=1&q={searchTerms}", "f").unwrap();
        assert!(xml.contains(r#"template="?x=1&amp;q={searchTerms}""#));
        assert!(xml.contains("http://h&lt;1&gt;/term/{searchTerms}"));
    }

    #[test]
    fn index_links_both_descriptors() {
        let html = render_index("go.example.org").unwrap();
        assert!(html.contains(r#"href="http://go.example.org/osd_term.xml" title="GO Search (term)""#));
        assert!(html.contains(
            r#"href="http://go.example.org/osd_gp.xml" title="GO Search (gene product)""#
        ));
        assert!(html.contains("Hello, World!"));
    }

    #[test]
    fn pages_render_descriptors_by_path() {
        let pages = Pages::render("h:1", SEARCH, "f").unwrap();
        assert!(pages.descriptor("/osd_term.xml").is_some_and(|x| x.contains("(term)")));
        assert!(pages.descriptor("/osd_gp.xml").is_some_and(|x| x.contains("(gene product)")));
        assert!(pages.descriptor("/osd_other.xml").is_none());
    }

    #[tokio::test]
    async fn missing_index_file_leaves_cache_empty() {
        let pages = Pages::render("h", SEARCH, "f")
            .unwrap()
            .load_index_html("definitely/not/here/index.html")
            .await
            .unwrap();
        assert!(pages.cached_index_html.is_empty());
    }
}
