//! `trustprobe wizard` - negotiate trust interactively.
//!
//! Each round evaluates the current submission, shows the outcome and offers
//! only the options the evaluation left displayed. Options that disappear are
//! cleared before the next round.

use anyhow::Result;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use std::process::ExitCode;
use trustprobe::{OptionalField, SubmittedFields};

use super::{evaluation_failed, exit_code, initial_fields, save_root, Context};
use crate::cli::args::WizardArgs;
use crate::output::{self, OutputFormat};

enum Choice {
    Toggle(OptionalField),
    Retry,
    Quit,
}

pub async fn execute(ctx: Context, args: WizardArgs) -> Result<ExitCode> {
    let negotiator = ctx.negotiator();
    // A cached root starts out accepted, as on first render of the form
    let mut fields = initial_fields(&args.baseurl, &args.shared)?.with_render_defaults();
    let theme = ColorfulTheme::default();

    let evaluation = loop {
        let evaluation = negotiator
            .evaluate(&fields)
            .await
            .map_err(evaluation_failed)?;
        println!();
        output::print_evaluation(OutputFormat::Pretty, &args.baseurl, &evaluation)?;

        if evaluation.is_accepted() {
            break evaluation;
        }

        let mut next = fields.resubmit(&evaluation);
        let options: Vec<OptionalField> = evaluation
            .display
            .iter()
            .filter(|field| field.is_selectable())
            .collect();

        if options.is_empty() {
            println!("{}", "Nothing left to adjust.".yellow());
            break evaluation;
        }

        if !choose(&theme, &options, &mut next)? {
            break evaluation;
        }
        fields = next;
    };

    if evaluation.is_accepted() {
        println!("{} {}", "Accepted:".green().bold(), args.baseurl);
    }
    if let Some(path) = &args.shared.save_root {
        save_root(path, &evaluation)?;
    }

    Ok(exit_code(&evaluation))
}

/// Let the operator tick options; true to resubmit, false to quit.
fn choose(
    theme: &ColorfulTheme,
    options: &[OptionalField],
    fields: &mut SubmittedFields,
) -> Result<bool> {
    loop {
        let mut items: Vec<(String, Choice)> = options
            .iter()
            .map(|&field| (option_item(field, fields), Choice::Toggle(field)))
            .collect();
        items.push(("Retry".to_string(), Choice::Retry));
        items.push(("Quit".to_string(), Choice::Quit));

        let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();
        let picked = Select::with_theme(theme)
            .with_prompt("Adjust and retry")
            .items(&labels)
            .default(options.len())
            .interact()?;

        match items.get(picked).map(|(_, choice)| choice) {
            Some(Choice::Toggle(OptionalField::TlsServerDiscoverRootca)) => {
                // An action, not a setting: submit right away
                fields.tls_server_discover_rootca = true;
                return Ok(true);
            }
            Some(Choice::Toggle(field)) => {
                let checked = fields.is_checked(*field);
                fields.set_checked(*field, !checked);
            }
            Some(Choice::Retry) => return Ok(true),
            Some(Choice::Quit) | None => return Ok(false),
        }
    }
}

fn option_item(field: OptionalField, fields: &SubmittedFields) -> String {
    if field == OptionalField::TlsServerDiscoverRootca {
        return format!("    {}", field.label());
    }
    let mark = if fields.is_checked(field) { "[x]" } else { "[ ]" };
    format!("{mark} {}", field.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_is_shown_as_an_action() {
        let fields = SubmittedFields {
            tls_server_ignore_cn: true,
            ..SubmittedFields::for_url("https://monitoring.example")
        };
        assert_eq!(
            option_item(OptionalField::TlsServerIgnoreCn, &fields),
            "[x] Ignore Remote CN"
        );
        assert_eq!(
            option_item(OptionalField::TlsServerInsecure, &fields),
            "[ ] Insecure Connection"
        );
        assert_eq!(
            option_item(OptionalField::TlsServerDiscoverRootca, &fields),
            "    Discover Root CA"
        );
    }
}
