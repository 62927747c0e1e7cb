use connectors::credentials::{CredentialContext, MfaCodeSupplier, RoleDescriptor};
use engine::config::{CopyConfig, CopySettings};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// TOML job file: two credential/table endpoints plus copy tunables.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub source: EndpointSpec,
    pub target: EndpointSpec,
    #[serde(default)]
    pub copy: CopySettings,
}

/// One store endpoint: which profile/region to authenticate with, which
/// table to address, and optionally a role to assume on top (with an MFA
/// serial when the role demands a one-time code).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSpec {
    pub profile: String,
    pub region: String,
    pub table: String,
    pub role_arn: Option<String>,
    pub role_session_name: Option<String>,
    pub mfa_serial: Option<String>,
}

impl JobFile {
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn copy_config(&self) -> CopyConfig {
        CopyConfig::new(&self.source.table, &self.target.table).with_settings(self.copy.clone())
    }
}

impl EndpointSpec {
    pub fn credential_context(&self) -> CredentialContext {
        let role = self.role_arn.as_ref().map(|arn| RoleDescriptor {
            role_arn: arn.clone(),
            session_name: self
                .role_session_name
                .clone()
                .unwrap_or_else(|| "dynocopy".to_string()),
            mfa_serial: self.mfa_serial.clone(),
        });

        let mfa_code = self
            .mfa_serial
            .as_ref()
            .map(|serial| stdin_mfa_supplier(serial.clone()));

        CredentialContext {
            profile: self.profile.clone(),
            region: self.region.clone(),
            role,
            mfa_code,
        }
    }
}

/// Interactive MFA step: prompts on stdin for the one-time code when the
/// role assumption asks for it.
fn stdin_mfa_supplier(serial: String) -> MfaCodeSupplier {
    Arc::new(move || {
        print!("Enter MFA code for {serial}: ");
        let _ = io::stdout().flush();
        let mut code = String::new();
        let _ = io::stdin().lock().read_line(&mut code);
        code.trim().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [source]
        profile = "default"
        region = "eu-central-1"
        table = "orders-stg"

        [target]
        profile = "prod-admin"
        region = "eu-central-1"
        table = "orders-prod"
        role_arn = "arn:aws:iam::000000000000:role/Admin"
        mfa_serial = "arn:aws:iam::000000000000:mfa/dev"

        [copy]
        page_size = 50
    "#;

    #[test]
    fn parses_a_full_job_file() {
        let job = JobFile::parse(SAMPLE).expect("parse");

        assert_eq!(job.source.table, "orders-stg");
        assert_eq!(job.target.profile, "prod-admin");
        assert_eq!(job.copy.page_size, 50);
        // Unset tunables keep their defaults.
        assert_eq!(job.copy.max_batch_size, 25);
    }

    #[test]
    fn copy_section_is_optional() {
        let minimal = r#"
            [source]
            profile = "default"
            region = "us-east-1"
            table = "a"

            [target]
            profile = "default"
            region = "us-east-1"
            table = "b"
        "#;
        let job = JobFile::parse(minimal).expect("parse");
        assert_eq!(job.copy, CopySettings::default());
    }

    #[test]
    fn role_descriptor_is_built_with_a_default_session_name() {
        let job = JobFile::parse(SAMPLE).expect("parse");
        let ctx = job.target.credential_context();

        let role = ctx.role.expect("role configured");
        assert_eq!(role.role_arn, "arn:aws:iam::000000000000:role/Admin");
        assert_eq!(role.session_name, "dynocopy");
        assert!(role.mfa_serial.is_some());
        assert!(ctx.mfa_code.is_some());
    }

    #[test]
    fn endpoints_without_roles_get_no_supplier() {
        let job = JobFile::parse(SAMPLE).expect("parse");
        let ctx = job.source.credential_context();

        assert!(ctx.role.is_none());
        assert!(ctx.mfa_code.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let bad = r#"
            [source]
            profile = "default"
            region = "us-east-1"
            table = "a"
            tabel = "typo"

            [target]
            profile = "default"
            region = "us-east-1"
            table = "b"
        "#;
        assert!(JobFile::parse(bad).is_err());
    }
}
