use crate::api::client::ApiClient;
use crate::api::events::LogLine;
use crate::api::models::{CampaignRequest, Customer};
use crate::error::{ApiError, ValidationError};

pub const CAMPAIGN_PLACEHOLDER: &str = "Select a Campaign Structure";

/// The six message structures the backend knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignType {
    SimpleText,
    PromoImage,
    OrderUpdate,
    ImageBody,
    TrackingLink,
    FullTemplate,
}

impl CampaignType {
    pub const ALL: [CampaignType; 6] = [
        CampaignType::SimpleText,
        CampaignType::PromoImage,
        CampaignType::OrderUpdate,
        CampaignType::ImageBody,
        CampaignType::TrackingLink,
        CampaignType::FullTemplate,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            CampaignType::SimpleText => "simple_text",
            CampaignType::PromoImage => "promo_image",
            CampaignType::OrderUpdate => "order_update",
            CampaignType::ImageBody => "image_body",
            CampaignType::TrackingLink => "tracking_link",
            CampaignType::FullTemplate => "full_template",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CampaignType::SimpleText => "Simple Text (No Vars)",
            CampaignType::PromoImage => "Promo (Image Header Only)",
            CampaignType::OrderUpdate => "Order Update (Body Vars Only)",
            CampaignType::ImageBody => "Image Header + Body Vars",
            CampaignType::TrackingLink => "Tracking Link (Body + Button)",
            CampaignType::FullTemplate => "Full Template (Header + Body + Button)",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_name() == name)
    }

    /// Dropdown position, the placeholder being 0.
    pub fn position(self) -> u32 {
        Self::ALL.iter().position(|c| *c == self).map_or(0, |i| i as u32 + 1)
    }

    pub fn at_position(pos: u32) -> Option<Self> {
        pos.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }
}

/// Dropdown labels, placeholder first.
pub fn campaign_labels() -> Vec<&'static str> {
    std::iter::once(CAMPAIGN_PLACEHOLDER)
        .chain(CampaignType::ALL.iter().map(|c| c.display_name()))
        .collect()
}

/// Current values of the campaign form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignForm {
    pub campaign: Option<CampaignType>,
    pub template_name: String,
    pub image_url: String,
}

impl CampaignForm {
    pub fn prepare(&self, customers: &[Customer]) -> Result<CampaignRequest, ValidationError> {
        let campaign = self.campaign.ok_or(ValidationError::NoCampaignSelected)?;
        let template_name = self.template_name.trim();
        if template_name.is_empty() {
            return Err(ValidationError::MissingTemplateName);
        }
        if customers.is_empty() {
            return Err(ValidationError::NoCustomers);
        }
        let image_url = self.image_url.trim();
        Ok(CampaignRequest {
            campaign_type: campaign.wire_name().to_string(),
            template_name: template_name.to_string(),
            image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
            customers: customers.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePreview {
    Placeholder,
    Show(String),
}

pub fn image_preview(url: &str) -> ImagePreview {
    match url.trim() {
        "" => ImagePreview::Placeholder,
        url => ImagePreview::Show(url.to_string()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Could not start campaign. {}", .0.detail())]
    Rejected(#[from] ApiError),
}

pub fn sending_line() -> LogLine {
    LogLine::info("--- Sending campaign request to backend... ---")
}

pub fn outcome_line(result: &Result<(), ApiError>) -> LogLine {
    match result {
        Ok(()) => LogLine::success("✅ Backend accepted campaign. Watch for progress..."),
        Err(e) => LogLine::error(format!("❌ ERROR: Could not start campaign. {}", e.detail())),
    }
}

/// Posts an already validated request, reporting progress to `log`.
pub async fn submit(
    api: &ApiClient,
    request: &CampaignRequest,
    mut log: impl FnMut(LogLine),
) -> Result<(), ApiError> {
    log(sending_line());
    let result = api.start_campaign(request).await;
    if let Err(e) = &result {
        log::error!("campaign rejected: {e}");
    }
    log(outcome_line(&result));
    result
}

/// Validates the form and submits it. Nothing is sent when validation fails.
pub async fn start(
    api: &ApiClient,
    form: &CampaignForm,
    customers: &[Customer],
    log: impl FnMut(LogLine),
) -> Result<(), CampaignError> {
    let request = form.prepare(customers)?;
    submit(api, &request, log).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::events::LogStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> CampaignForm {
        CampaignForm {
            campaign: Some(CampaignType::OrderUpdate),
            template_name: " order_update_v2 ".into(),
            image_url: "   ".into(),
        }
    }

    fn alice() -> Vec<Customer> {
        vec![Customer::manual("Alice", "555", "+1")]
    }

    #[test]
    fn validation_order() {
        let customers = alice();
        let mut f = CampaignForm::default();
        assert_eq!(f.prepare(&customers), Err(ValidationError::NoCampaignSelected));
        f.campaign = Some(CampaignType::SimpleText);
        assert_eq!(f.prepare(&customers), Err(ValidationError::MissingTemplateName));
        f.template_name = "hello".into();
        assert_eq!(f.prepare(&[]), Err(ValidationError::NoCustomers));
        assert!(f.prepare(&customers).is_ok());
    }

    #[test]
    fn request_trims_and_nulls_empty_image() {
        let request = form().prepare(&alice()).unwrap();
        assert_eq!(request.campaign_type, "order_update");
        assert_eq!(request.template_name, "order_update_v2");
        assert_eq!(request.image_url, None);
    }

    #[test]
    fn dropdown_positions_round_trip() {
        assert_eq!(CampaignType::at_position(0), None);
        for c in CampaignType::ALL {
            assert_eq!(CampaignType::at_position(c.position()), Some(c));
            assert_eq!(CampaignType::from_wire(c.wire_name()), Some(c));
            assert_eq!(campaign_labels()[c.position() as usize], c.display_name());
        }
        assert_eq!(CampaignType::from_wire(CAMPAIGN_PLACEHOLDER), None);
    }

    #[test]
    fn preview_follows_url() {
        assert_eq!(image_preview("  "), ImagePreview::Placeholder);
        assert_eq!(
            image_preview(" https://cdn.example.com/a.png "),
            ImagePreview::Show("https://cdn.example.com/a.png".into())
        );
    }

    #[tokio::test]
    async fn empty_customer_list_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/start-campaign"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut lines = Vec::new();
        let err = start(&api, &form(), &[], |l| lines.push(l)).await.unwrap_err();
        assert!(matches!(err, CampaignError::Invalid(ValidationError::NoCustomers)));
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn rejection_reports_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/start-campaign"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "Unknown template"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut lines = Vec::new();
        let err = start(&api, &form(), &alice(), |l| lines.push(l)).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not start campaign. Unknown template");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].status, LogStatus::Info);
        assert_eq!(lines[1].status, LogStatus::Error);
        assert_eq!(lines[1].message, "❌ ERROR: Could not start campaign. Unknown template");
    }

    #[tokio::test]
    async fn accepted_campaign_logs_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/start-campaign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "started"})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut lines = Vec::new();
        start(&api, &form(), &alice(), |l| lines.push(l)).await.unwrap();
        assert_eq!(lines[1].status, LogStatus::Success);
    }
}
