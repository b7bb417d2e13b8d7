//! Transition email templates.
//!
//! Templates are looked up by `(step, has_agreed_price)`:
//! `step_{n}_with_price` / `step_{n}_without_price`, then `step_{n}`.
//! Placeholders use `{{name}}` and are filled from [`TemplateVariables`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::influencer::Influencer;
use super::workflow::{PartnershipWorkflow, WorkflowStep};
use crate::domain::errors::{DomainError, DomainResult};

pub const COUNTERPROPOSAL_KEY: &str = "counterproposal";
pub const COUNTERPROPOSAL_ACCEPTED_KEY: &str = "counterproposal_accepted";

/// Subject and body with `{{placeholders}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

impl EmailTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// A template resolved to final text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub template_key: String,
    pub subject: String,
    pub body: String,
}

/// Fixed variable map handed to templates.
pub type TemplateVariables = BTreeMap<String, String>;

/// Build the variable map for a workflow.
pub fn template_variables(
    workflow: &PartnershipWorkflow,
    influencer: &Influencer,
    portal_url: Option<&str>,
) -> TemplateVariables {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let entries = [
        ("influencer_name", influencer.name.clone()),
        (
            "agreed_price",
            workflow
                .terms
                .agreed_price
                .map(|p| p.normalize().to_string())
                .unwrap_or_default(),
        ),
        (
            "contact_email",
            workflow
                .terms
                .contact_email
                .clone()
                .or_else(|| influencer.email.clone())
                .unwrap_or_default(),
        ),
        (
            "contact_instagram",
            workflow
                .terms
                .contact_instagram
                .clone()
                .or_else(|| influencer.instagram_handle.clone())
                .unwrap_or_default(),
        ),
        (
            "contact_whatsapp",
            workflow
                .terms
                .contact_whatsapp
                .clone()
                .or_else(|| influencer.whatsapp_phone.clone())
                .unwrap_or_default(),
        ),
        (
            "shipping_address",
            workflow
                .shipping
                .shipping_address
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        ),
        ("product_suggestion_1", text(&workflow.shipping.product_suggestion_1)),
        ("product_suggestion_2", text(&workflow.shipping.product_suggestion_2)),
        ("product_suggestion_3", text(&workflow.shipping.product_suggestion_3)),
        ("selected_product_url", text(&workflow.preparation.selected_product_url)),
        ("coupon_code", text(&workflow.preparation.coupon_code)),
        ("contract_url", text(&workflow.contract.contract_url)),
        ("tracking_url", text(&workflow.shipment.tracking_url)),
        ("portal_url", portal_url.unwrap_or_default().to_string()),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Replace every `{{name}}` with its value. Unknown placeholders stay verbatim.
pub fn render(text: &str, variables: &TemplateVariables) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match variables.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Catalog of templates keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplates {
    templates: HashMap<String, EmailTemplate>,
}

impl Default for EmailTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EmailTemplates {
    /// Built-in English templates.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        let mut add = |key: &str, subject: &str, body: &str| {
            templates.insert(key.to_string(), EmailTemplate::new(subject, body));
        };

        add(
            "step_1_with_price",
            "Partnership confirmed, {{influencer_name}}!",
            "Hi {{influencer_name}},\n\nWe are happy to confirm our partnership for {{agreed_price}}.\n\
             Please send us your shipping address and up to three product suggestions: {{portal_url}}",
        );
        add(
            "step_1_without_price",
            "Welcome aboard, {{influencer_name}}!",
            "Hi {{influencer_name}},\n\nThank you for joining us.\n\
             Please send us your shipping address and up to three product suggestions: {{portal_url}}",
        );
        add(
            "step_2",
            "We received your shipping details",
            "Hi {{influencer_name}},\n\nThanks! We will ship to {{shipping_address}}.\n\
             Our team is now preparing your product.",
        );
        add(
            "step_3",
            "Your product and discount code are ready",
            "Hi {{influencer_name}},\n\nWe selected {{selected_product_url}} for you.\n\
             Your personal discount code is {{coupon_code}}.",
        );
        add(
            "step_4",
            "Contract signed",
            "Hi {{influencer_name}},\n\nThank you for signing the contract ({{contract_url}}).\n\
             Your parcel will be shipped shortly.",
        );
        add(
            "step_5",
            "Your parcel is on its way",
            "Hi {{influencer_name}},\n\nYour parcel has shipped. Track it here: {{tracking_url}}\n\
             Remember to share your code {{coupon_code}} with your audience.",
        );
        add(
            COUNTERPROPOSAL_KEY,
            "A new proposal for you, {{influencer_name}}",
            "Hi {{influencer_name}},\n\nWe would like to propose {{agreed_price}} for this partnership.\n\
             You can accept or reply here: {{portal_url}}",
        );
        add(
            COUNTERPROPOSAL_ACCEPTED_KEY,
            "Proposal accepted",
            "Hi {{influencer_name}},\n\nThe partnership price of {{agreed_price}} is confirmed.\n\
             Next, please send us your shipping details: {{portal_url}}",
        );

        Self { templates }
    }

    /// Built-ins overridden by the entries of a YAML map file.
    pub fn with_overrides_from_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ValidationFailed(format!(
                "Failed to read email templates {}: {e}",
                path.display()
            ))
        })?;
        Self::with_overrides_from_yaml(&content)
    }

    pub fn with_overrides_from_yaml(yaml: &str) -> DomainResult<Self> {
        let overrides: HashMap<String, EmailTemplate> = serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        let mut catalog = Self::builtin();
        catalog.templates.extend(overrides);
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&EmailTemplate> {
        self.templates.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: EmailTemplate) {
        self.templates.insert(key.into(), template);
    }

    pub fn remove(&mut self, key: &str) -> Option<EmailTemplate> {
        self.templates.remove(key)
    }

    /// Template for a step transition, most specific key first.
    pub fn select(&self, step: WorkflowStep, has_agreed_price: bool) -> (String, EmailTemplate) {
        let n = step.number();
        let specific = if has_agreed_price {
            format!("step_{n}_with_price")
        } else {
            format!("step_{n}_without_price")
        };
        let generic = format!("step_{n}");

        for key in [specific, generic.clone()] {
            if let Some(template) = self.templates.get(&key) {
                return (key, template.clone());
            }
        }

        (
            generic,
            EmailTemplate::new(
                format!("Partnership update: {} completed", step.label()),
                "Hi {{influencer_name}},\n\nYour partnership has moved forward. \
                 Check the latest status here: {{portal_url}}",
            ),
        )
    }

    /// Render the transition template for `step`.
    pub fn render_step(
        &self,
        step: WorkflowStep,
        has_agreed_price: bool,
        variables: &TemplateVariables,
    ) -> RenderedEmail {
        let (key, template) = self.select(step, has_agreed_price);
        RenderedEmail {
            template_key: key,
            subject: render(&template.subject, variables),
            body: render(&template.body, variables),
        }
    }

    /// Render a named template.
    pub fn render_key(&self, key: &str, variables: &TemplateVariables) -> DomainResult<RenderedEmail> {
        let template = self
            .get(key)
            .ok_or_else(|| DomainError::ValidationFailed(format!("Unknown email template: {key}")))?;
        Ok(RenderedEmail {
            template_key: key.to_string(),
            subject: render(&template.subject, variables),
            body: render(&template.body, variables),
        })
    }
}
