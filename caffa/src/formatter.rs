use caffa_core::{Access, FieldDescriptor, MethodDescriptor, Session, TypeDescriptor};
use colored::*;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct KeywordList(pub Vec<String>);

pub struct MethodList(pub Vec<MethodDescriptor>);

pub struct SessionInfo<'a>(pub &'a Session);

pub struct Done(pub String);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Error:".red().bold(), err))
    }
}

impl From<Done> for FormattedString {
    fn from(Done(msg): Done) -> Self {
        FormattedString(format!("{} {}", "OK".green().bold(), msg))
    }
}

impl From<SessionInfo<'_>> for FormattedString {
    fn from(SessionInfo(session): SessionInfo<'_>) -> Self {
        let app = session.app_info();
        FormattedString(format!(
            "{} {}\n{} {} ({})",
            "Application:".bold(),
            app.to_string().green(),
            "Session:".bold(),
            session.id().cyan(),
            session.session_type()
        ))
    }
}

impl From<KeywordList> for FormattedString {
    fn from(KeywordList(keywords): KeywordList) -> Self {
        if keywords.is_empty() {
            return FormattedString("No schemas found.".yellow().to_string());
        }

        let mut out = String::new();
        out.push_str("Available Classes:\n");
        for keyword in keywords {
            out.push_str(&format!("  - {}\n", keyword.green()));
        }
        FormattedString(out.trim_end().to_string())
    }
}

fn format_field(field: &FieldDescriptor) -> String {
    let access = match field.access {
        Access::ReadWrite => String::new(),
        Access::ReadOnly => format!(" {}", "(read only)".dimmed()),
        Access::WriteOnly => format!(" {}", "(write only)".dimmed()),
    };
    format!(
        "    {} {}{}",
        field.field_type.to_string().cyan(),
        field.name,
        access
    )
}

fn format_method(method: &MethodDescriptor) -> String {
    let arguments = match (&method.labelled, &method.positional) {
        (Some(labelled), _) => labelled
            .iter()
            .map(|(name, field_type)| format!("{}: {}", name, field_type.to_string().cyan()))
            .collect::<Vec<_>>()
            .join(", "),
        (None, Some(positional)) => positional
            .iter()
            .map(|field_type| field_type.to_string().cyan().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        (None, None) => String::new(),
    };
    let returns = method
        .returns
        .map(|field_type| format!(" -> {}", field_type.to_string().cyan()))
        .unwrap_or_default();

    format!(
        "    {} {}({}){}",
        "method".purple(),
        method.name.green(),
        arguments,
        returns
    )
}

impl From<&TypeDescriptor> for FormattedString {
    fn from(descriptor: &TypeDescriptor) -> Self {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {} {{\n",
            "class".purple(),
            descriptor.keyword.green()
        ));
        for field in descriptor.fields.values() {
            out.push_str(&format_field(field));
            out.push('\n');
        }
        if !descriptor.methods.is_empty() && !descriptor.fields.is_empty() {
            out.push('\n');
        }
        for method in descriptor.methods.values() {
            out.push_str(&format_method(method));
            out.push('\n');
        }
        out.push('}');
        FormattedString(out)
    }
}

impl From<MethodList> for FormattedString {
    fn from(MethodList(methods): MethodList) -> Self {
        if methods.is_empty() {
            return FormattedString("No methods found.".yellow().to_string());
        }

        let lines: Vec<String> = methods.iter().map(format_method).collect();
        FormattedString(lines.join("\n"))
    }
}
