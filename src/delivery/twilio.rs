use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::appsettings::VoiceSettings;

use super::{CallHandle, VoiceTransport};

#[derive(Deserialize)]
struct CallResource {
    sid: String,
}

/// Places calls through the Twilio REST API, reading the text with `<Say>`.
pub struct TwilioVoiceTransport {
    client: reqwest::Client,
    calls_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    language: String,
}

impl TwilioVoiceTransport {
    pub fn new(settings: &VoiceSettings) -> Self {
        let calls_url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            settings.endpoint.trim_end_matches('/'),
            settings.account_sid
        );

        Self {
            client: reqwest::Client::new(),
            calls_url,
            account_sid: settings.account_sid.clone(),
            auth_token: settings.auth_token.clone(),
            from_number: settings.from_number.clone(),
            language: settings.language.clone(),
        }
    }

    fn twiml(&self, spoken_text: &str) -> String {
        format!(
            r#"<Response><Say language="{}">{}</Say></Response>"#,
            escape_xml(&self.language),
            escape_xml(spoken_text)
        )
    }
}

#[async_trait]
impl VoiceTransport for TwilioVoiceTransport {
    async fn place_call(&self, to_number: &str, spoken_text: &str) -> anyhow::Result<CallHandle> {
        let twiml = self.twiml(spoken_text);
        let params = [
            ("To", to_number),
            ("From", self.from_number.as_str()),
            ("Twiml", twiml.as_str()),
        ];

        let call: CallResource = self
            .client
            .post(&self.calls_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?
            .error_for_status()
            .context("Twilio rejected the call")?
            .json()
            .await?;

        Ok(CallHandle(call.sid))
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> TwilioVoiceTransport {
        TwilioVoiceTransport::new(&VoiceSettings {
            account_sid: "AC123".to_owned(),
            auth_token: "secret".to_owned(),
            from_number: "+15550000000".to_owned(),
            language: "en-US".to_owned(),
            endpoint: "https://api.twilio.com".to_owned(),
        })
    }

    #[test]
    fn calls_url_is_scoped_to_account() {
        assert_eq!(
            transport().calls_url,
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Calls.json"
        );
    }

    #[test]
    fn twiml_escapes_spoken_text() {
        let twiml = transport().twiml("Q&A <prep>");

        assert_eq!(
            twiml,
            r#"<Response><Say language="en-US">Q&amp;A &lt;prep&gt;</Say></Response>"#
        );
    }
}
