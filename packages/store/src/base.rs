use guestmail_common::Stage;

/// Template skeleton cloned into every newly onboarded property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseTemplate {
    pub name: &'static str,
    pub stage: Stage,
    pub source: &'static str,
}

static BASE_SET: [BaseTemplate; 11] = [
    BaseTemplate {
        name: "Welcome",
        stage: Stage::PreArrival,
        source: include_str!("../templates/welcome.mjml"),
    },
    BaseTemplate {
        name: "Check-in Reminder",
        stage: Stage::PreArrival,
        source: include_str!("../templates/checkin_reminder.mjml"),
    },
    BaseTemplate {
        name: "Checked In",
        stage: Stage::CheckIn,
        source: include_str!("../templates/checked_in.mjml"),
    },
    BaseTemplate {
        name: "Room is Ready",
        stage: Stage::CheckIn,
        source: include_str!("../templates/room_ready.mjml"),
    },
    BaseTemplate {
        name: "Add-on Confirmation",
        stage: Stage::AddOns,
        source: include_str!("../templates/addon_confirmation.mjml"),
    },
    BaseTemplate {
        name: "Add-on Declined",
        stage: Stage::AddOns,
        source: include_str!("../templates/addon_declined.mjml"),
    },
    BaseTemplate {
        name: "Express Check-out",
        stage: Stage::CheckOut,
        source: include_str!("../templates/express_checkout.mjml"),
    },
    BaseTemplate {
        name: "Invoice",
        stage: Stage::PostStay,
        source: include_str!("../templates/invoice.mjml"),
    },
    BaseTemplate {
        name: "Guest Survey",
        stage: Stage::PostStay,
        source: include_str!("../templates/guest_survey.mjml"),
    },
    BaseTemplate {
        name: "Pay By Link",
        stage: Stage::General,
        source: include_str!("../templates/pay_by_link.mjml"),
    },
    BaseTemplate {
        name: "Resend Guest Flow",
        stage: Stage::General,
        source: include_str!("../templates/resend_guest_flow.mjml"),
    },
];

/// The default skeleton set, covering all six stages
pub fn base_templates() -> &'static [BaseTemplate] {
    &BASE_SET
}

/// Body given to a template created from scratch
pub fn starter_source(name: &str) -> String {
    format!(
        r##"<mjml>
  <mj-body>
    <mj-section>
      <mj-column>
        <mj-text font-size="20px" color="#333" font-family="helvetica">
          New Template: {name}
        </mj-text>
        <mj-text color="#555">
          Start building your email here.
        </mj-text>
      </mj-column>
    </mj-section>
  </mj-body>
</mjml>"##
    )
}
