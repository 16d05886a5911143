//! Automation rule listing and upserts.

use jd_core::{AutomationRulePayload, RuleSummary};
use serde::Deserialize;

use crate::{JiraClient, error::JiraError, http::{check_response, decode_json}};

#[derive(Deserialize)]
struct RulesResponse {
    #[serde(default)]
    values: Vec<RuleSummary>,
}

const RULES_PATH: &str = "/rest/api/3/automation/rules";

impl JiraClient {
    pub(crate) async fn get_automation_rules(
        &self,
        project_key: &str,
    ) -> Result<Vec<RuleSummary>, JiraError> {
        let url = self.endpoint(&format!(
            "{RULES_PATH}?projectKey={}",
            urlencoding::encode(project_key)
        ));
        let resp = check_response(self.http.get(&url).send().await?).await?;

        let data: RulesResponse = decode_json(resp).await?;
        Ok(data.values)
    }

    pub(crate) async fn post_automation_rule(
        &self,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError> {
        let url = self.endpoint(RULES_PATH);
        check_response(self.http.post(&url).json(payload).send().await?).await?;
        Ok(())
    }

    pub(crate) async fn put_automation_rule(
        &self,
        rule_id: &str,
        payload: &AutomationRulePayload,
    ) -> Result<(), JiraError> {
        let url = self.endpoint(&format!("{RULES_PATH}/{}", urlencoding::encode(rule_id)));
        check_response(self.http.put(&url).json(payload).send().await?).await?;
        Ok(())
    }
}
