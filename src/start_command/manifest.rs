use super::StartCommandError;
use serde_yaml::Value;

const APPLICATIONS_KEY: &str = "applications";
const COMMAND_KEY: &str = "command";

/// Application manifest (`manifest.yml`). The document is kept as a generic YAML value so every
/// field other than the first application's command is written back as it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    document: Value,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, StartCommandError> {
        let document: Value = serde_yaml::from_str(content)?;
        if !document.is_mapping() {
            return Err(StartCommandError::Parse(
                "manifest is not a YAML mapping".to_string(),
            ));
        }
        Ok(Self { document })
    }

    /// Command of the first application block.
    pub fn command(&self) -> Result<&str, StartCommandError> {
        self.first_application()
            .and_then(|app| app.get(COMMAND_KEY))
            .and_then(Value::as_str)
            .ok_or_else(|| StartCommandError::MissingCommand("manifest application command".into()))
    }

    /// Replaces the command of the first application block.
    pub fn set_command(&mut self, command: String) -> Result<(), StartCommandError> {
        let application = self
            .document
            .get_mut(APPLICATIONS_KEY)
            .and_then(Value::as_sequence_mut)
            .and_then(|apps| apps.first_mut())
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| StartCommandError::MissingCommand("manifest application".into()))?;
        application.insert(Value::from(COMMAND_KEY), Value::from(command));
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, StartCommandError> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    fn first_application(&self) -> Option<&Value> {
        self.document
            .get(APPLICATIONS_KEY)
            .and_then(Value::as_sequence)
            .and_then(|apps| apps.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const MANIFEST: &str = r#"
applications:
- name: my-app
  memory: 512M
  command: cd /app && exec dotnet ./app.dll
  env:
    ASPNETCORE_ENVIRONMENT: Production
- name: other-app
  command: exec ./other
"#;

    #[test]
    fn command_of_first_application() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.command().unwrap(), "cd /app && exec dotnet ./app.dll");
    }

    #[test]
    fn set_command_only_touches_first_application() {
        let mut manifest = Manifest::parse(MANIFEST).unwrap();

        manifest.set_command("new command".to_string()).unwrap();

        let written: Value = serde_yaml::from_str(&manifest.to_yaml().unwrap()).unwrap();
        let apps = written["applications"].as_sequence().unwrap();
        assert_eq!(apps[0]["command"], Value::from("new command"));
        assert_eq!(apps[0]["name"], Value::from("my-app"));
        assert_eq!(apps[0]["memory"], Value::from("512M"));
        assert_eq!(
            apps[0]["env"]["ASPNETCORE_ENVIRONMENT"],
            Value::from("Production")
        );
        assert_eq!(apps[1]["command"], Value::from("exec ./other"));
    }

    #[test]
    fn field_order_is_preserved() {
        let mut manifest = Manifest::parse(MANIFEST).unwrap();
        manifest.set_command("new command".to_string()).unwrap();

        let written = manifest.to_yaml().unwrap();
        let name = written.find("name: my-app").unwrap();
        let memory = written.find("memory: 512M").unwrap();
        let command = written.find("command: new command").unwrap();
        assert!(name < memory && memory < command);
    }

    #[test]
    fn comments_are_dropped_on_rewrite() {
        let mut manifest =
            Manifest::parse("---\n# deploy config\napplications:\n- name: app # main\n  command: exec ./app\n")
                .unwrap();
        manifest.set_command("new command".to_string()).unwrap();

        let written = manifest.to_yaml().unwrap();

        assert!(!written.contains('#'));
        assert_eq!(written, "applications:\n- name: app\n  command: new command\n");
    }

    #[test]
    fn missing_command() {
        let manifest = Manifest::parse("applications:\n- name: my-app\n").unwrap();
        assert_matches!(manifest.command(), Err(StartCommandError::MissingCommand(_)));

        let mut manifest = Manifest::parse("applications: []\n").unwrap();
        assert_matches!(
            manifest.set_command("cmd".to_string()),
            Err(StartCommandError::MissingCommand(_))
        );
    }

    #[test]
    fn malformed_manifest() {
        assert_matches!(
            Manifest::parse("applications: [unclosed"),
            Err(StartCommandError::Yaml(_))
        );
        assert_matches!(
            Manifest::parse("just a string"),
            Err(StartCommandError::Parse(_))
        );
    }
}
