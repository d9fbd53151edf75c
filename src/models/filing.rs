use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Office {
    House,
    Senate,
}

impl std::fmt::Display for Office {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Office::House => write!(f, "House"),
            Office::Senate => write!(f, "Senate"),
        }
    }
}

/// One filing as reported by a source, in the only shape the pipeline core sees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilingDescriptor {
    pub doc_id: String,
    pub pdf_url: String,
    pub member_name: String,
    pub office: Office,
}

impl FilingDescriptor {
    pub fn new(
        doc_id: impl Into<String>,
        pdf_url: impl Into<String>,
        member_name: impl Into<String>,
        office: Office,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            pdf_url: pdf_url.into(),
            member_name: member_name.into(),
            office,
        }
    }

    /// Adapters map a missing id to an empty string; such records are never processed.
    pub fn has_doc_id(&self) -> bool {
        !self.doc_id.trim().is_empty()
    }
}

/// A result row from the House Clerk member search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseSearchRow {
    pub member_name: String,
    pub office: String,
    pub filing_year: String,
    pub filing_type: String,
    pub pdf_href: String,
}

impl HouseSearchRow {
    pub fn is_ptr(&self) -> bool {
        self.filing_type.to_uppercase().starts_with("PTR")
    }

    /// The document id is the PDF file stem, e.g. `.../2024/20024542.pdf` -> `20024542`.
    pub fn doc_id(&self) -> Option<String> {
        let file = self.pdf_href.rsplit('/').next()?;
        let stem = file.strip_suffix(".pdf").unwrap_or(file).trim();
        if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        }
    }

    pub fn into_descriptor(self, base_url: &str) -> FilingDescriptor {
        let doc_id = self.doc_id().unwrap_or_default();
        let href = self.pdf_href.trim_start_matches('/');
        let pdf_url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}/{}", base_url.trim_end_matches('/'), href)
        };
        FilingDescriptor {
            doc_id,
            pdf_url,
            member_name: self.member_name,
            office: Office::House,
        }
    }
}

/// Electronic eFD reports are HTML tables; paper reports are scanned images.
pub fn is_paper_report(url: &str) -> bool {
    url.contains("/view/paper/")
}

/// A report link from the Senate eFD search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenateReportLink {
    pub first_name: String,
    pub last_name: String,
    pub filer_office: String,
    pub href: Option<String>,
    pub filed_date: String,
}

impl SenateReportLink {
    pub fn member_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.filer_office.trim().to_string()
        } else {
            name.to_string()
        }
    }

    pub fn doc_id(&self) -> Option<String> {
        let href = self.href.as_deref()?;
        href.trim_end_matches('/')
            .rsplit('/')
            .next()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }


    pub fn into_descriptor(self, base_url: &str) -> FilingDescriptor {
        let doc_id = self.doc_id().unwrap_or_default();
        let member_name = self.member_name();
        let pdf_url = match self.href {
            Some(href) if href.starts_with("http") => href,
            Some(href) => format!("{}{}", base_url.trim_end_matches('/'), href),
            None => String::new(),
        };
        FilingDescriptor {
            doc_id,
            pdf_url,
            member_name,
            office: Office::Senate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_row_descriptor() {
        let row = HouseSearchRow {
            member_name: "Pelosi, Hon.. Nancy".to_string(),
            office: "CA11".to_string(),
            filing_year: "2024".to_string(),
            filing_type: "PTR Original".to_string(),
            pdf_href: "public_disc/ptr-pdfs/2024/20024542.pdf".to_string(),
        };
        assert!(row.is_ptr());
        let filing = row.into_descriptor("https://disclosures-clerk.house.gov/");
        assert_eq!(filing.doc_id, "20024542");
        assert_eq!(
            filing.pdf_url,
            "https://disclosures-clerk.house.gov/public_disc/ptr-pdfs/2024/20024542.pdf"
        );
        assert_eq!(filing.office, Office::House);
    }

    #[test]
    fn test_senate_link_descriptor() {
        let link = SenateReportLink {
            first_name: "Thomas".to_string(),
            last_name: "Carper".to_string(),
            filer_office: "Carper, Thomas R. (Senator)".to_string(),
            href: Some("/search/view/ptr/3a0bf2ce-1b5a-4b23-9a5c-1c6f9d1a7e1e/".to_string()),
            filed_date: "01/05/2024".to_string(),
        };
        let filing = link.into_descriptor("https://efdsearch.senate.gov");
        assert_eq!(filing.doc_id, "3a0bf2ce-1b5a-4b23-9a5c-1c6f9d1a7e1e");
        assert_eq!(filing.member_name, "Thomas Carper");
        assert!(filing.pdf_url.starts_with("https://efdsearch.senate.gov/search/view/ptr/"));
        assert!(!is_paper_report(&filing.pdf_url));
    }

    #[test]
    fn test_senate_link_without_href_has_no_doc_id() {
        let link = SenateReportLink {
            first_name: String::new(),
            last_name: String::new(),
            filer_office: "Office of Senator X".to_string(),
            href: None,
            filed_date: String::new(),
        };
        assert_eq!(link.member_name(), "Office of Senator X");
        let filing = link.into_descriptor("https://efdsearch.senate.gov");
        assert!(!filing.has_doc_id());
    }
}
