//! Migration comments left where code could not be rewritten automatically

use sdkmig_core::Edit;

const PREFIX: &str = "AWS SDK for Java v2 migration: ";

/// The block comment inserted for `message`
pub fn comment_text(message: &str) -> String {
    format!("/*{}{}*/", PREFIX, message)
}

/// Insert a migration comment right before the node starting at `offset`
///
/// Returns `None` when the same comment is already there, so re-running a
/// rule never stacks duplicates.
pub fn annotate(source: &str, offset: usize, message: &str) -> Option<Edit> {
    let text = comment_text(message);
    if source[..offset].trim_end().ends_with(&text) {
        return None;
    }
    Some(Edit::insert(offset, text, format!("Annotate: {}", message)))
}

/// True when `text` holds a migration comment
pub fn has_comment(text: &str) -> bool {
    text.contains(&format!("/*{}", PREFIX))
}

/// True when `source` already carries any migration comment right before `offset`
pub fn is_annotated(source: &str, offset: usize) -> bool {
    let before = source[..offset].trim_end();
    before.ends_with("*/")
        && before
            .rfind("/*")
            .is_some_and(|start| before[start + 2..].starts_with(PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::apply_edits;

    #[test]
    fn test_annotate_once() {
        let source = "s3.setRegion(r);";
        let edit = annotate(source, 0, "Transform not supported").unwrap();
        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(
            result,
            "/*AWS SDK for Java v2 migration: Transform not supported*/s3.setRegion(r);"
        );

        let offset = result.find("s3.").unwrap();
        assert!(annotate(&result, offset, "Transform not supported").is_none());
        assert!(is_annotated(&result, offset));
        assert!(annotate(&result, offset, "Something else").is_some());
    }

    #[test]
    fn test_has_comment() {
        assert!(has_comment(&comment_text("setRegion is not supported")));
        assert!(!has_comment("/* AWS SDK for Java v1 */ s3.setRegion(r);"));
    }
}
