//! Interactive terminal form against a locally loaded bundle

use anyhow::{Context, Result};
use iris_lib::{
    models::MeasurementField, ArtifactLoader, HistoryTable, MeasurementForm, ModelBundle,
    Session, SuccessNotice,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

use crate::output::{print_success, OutputFormat};

/// Load the bundle and run the form on stdin/stdout until EOF
pub fn run(artifact: &Path, format: OutputFormat) -> Result<()> {
    let loader = ArtifactLoader::new(artifact);
    let bundle = loader
        .load_bundle()
        .with_context(|| format!("Failed to load model bundle from {}", artifact.display()))?;
    debug!(version = %bundle.short_version(), "Model bundle loaded");

    // With JSON output, stdout carries only the final document
    let mut input = io::stdin().lock();
    let session = match format {
        OutputFormat::Json => run_form(&mut input, &mut io::stderr().lock(), &bundle),
        OutputFormat::Table => run_form(&mut input, &mut io::stdout().lock(), &bundle),
    }
    .context("Terminal I/O failed")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(session.history())?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            println!();
            print_success(&format!(
                "Session ended with {} predictions",
                session.history().len()
            ));
        }
    }

    Ok(())
}

/// Read one line; `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirmed(answer: &str, default: bool) -> bool {
    match answer.to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

/// Drive the form until the input ends, returning the session it built
pub fn run_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    bundle: &ModelBundle,
) -> io::Result<Session> {
    let mut session = Session::new();
    let mut form = MeasurementForm::new();

    loop {
        writeln!(out, "Enter the measurements (blank = 0.0)")?;
        for field in MeasurementField::ALL {
            if !prompt_field(input, out, &mut form, field)? {
                return Ok(session);
            }
        }

        write!(out, "Submit? [Y/n] ")?;
        out.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(session);
        };
        if !confirmed(&answer, true) {
            form.reset();
            writeln!(out, "Discarded")?;
            continue;
        }

        // Every field was validated while prompting
        let record = match form.submit() {
            Ok(record) => record,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match session.submit(&record, bundle) {
            Ok(result) => {
                for line in SuccessNotice::from(result).lines() {
                    writeln!(out, "{}", line)?;
                }
            }
            Err(e) => {
                writeln!(out, "Prediction failed: {}", e)?;
                continue;
            }
        }

        write!(out, "Show predictions so far? [y/N] ")?;
        out.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(session);
        };
        if confirmed(&answer, false) {
            let table = HistoryTable::from_history(session.history().all());
            writeln!(out, "{}", table.render())?;
        }
    }
}

/// Prompt until the field holds a valid value; `false` at end of input
fn prompt_field<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    form: &mut MeasurementForm,
    field: MeasurementField,
) -> io::Result<bool> {
    loop {
        write!(out, "{}: ", field.label())?;
        out.flush()?;
        let Some(value) = read_line(input)? else {
            return Ok(false);
        };
        form.set(field, value);
        match form.validate_field(field) {
            Ok(_) => return Ok(true),
            Err(e) => writeln!(out, "{}", e)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_lib::artifact::parse_bundle;
    use iris_lib::MeasurementRecord;
    use std::io::Cursor;

    const IRIS_BUNDLE_JSON: &str = include_str!("../../../../ml/ML_items");

    fn bundle() -> ModelBundle {
        parse_bundle(IRIS_BUNDLE_JSON.as_bytes(), Path::new("ml/ML_items")).unwrap()
    }

    fn drive(input: &str) -> (Session, String) {
        let mut out = Vec::new();
        let session = run_form(&mut Cursor::new(input), &mut out, &bundle()).unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_single_submission() {
        let (session, out) = drive("5.1\n3.5\n1.4\n0.2\ny\nn\n");
        assert_eq!(session.history().len(), 1);
        assert!(out.contains("Predicted class: 0 (setosa)"), "{}", out);
        assert!(out.contains("Confidence score: 0.98"), "{}", out);
        assert!(!out.contains("predicted class"), "table shown unasked: {}", out);
    }

    #[test]
    fn test_blank_fields_submit_zeros() {
        let (session, _) = drive("\n\n\n\n\n");
        assert_eq!(
            session.history().all()[0].record(),
            MeasurementRecord::default()
        );
    }

    #[test]
    fn test_invalid_value_reprompts() {
        let (session, out) = drive("abc\n5.1\n3.5\n1.4\n0.2\n\n");
        assert!(out.contains("Sepal length (cm) must be a number, got \"abc\""));
        assert_eq!(out.matches("Sepal length (cm): ").count(), 2);
        assert_eq!(session.history().all()[0].sepal_length, 5.1);
    }

    #[test]
    fn test_declined_submission_is_discarded() {
        let (session, out) = drive("5.1\n3.5\n1.4\n0.2\nn\n");
        assert!(session.history().is_empty());
        assert!(out.contains("Discarded"));
    }

    #[test]
    fn test_history_table_on_request() {
        let input = "5.1\n3.5\n1.4\n0.2\ny\nn\n6.7\n3.0\n5.2\n2.3\ny\ny\n";
        let (session, out) = drive(input);
        assert_eq!(session.history().len(), 2);
        assert!(out.contains("predicted class"));
        assert!(out.contains("6.7"));
    }

    #[test]
    fn test_eof_mid_form_ends_session() {
        let (session, _) = drive("5.1\n3.5\n");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_confirmed() {
        assert!(confirmed("", true));
        assert!(!confirmed("", false));
        assert!(confirmed("Y", false));
        assert!(confirmed("yes", false));
        assert!(!confirmed("n", true));
    }
}
