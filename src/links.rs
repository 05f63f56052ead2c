use crate::CrawlerError;
use std::path::Path;
use tracing::debug;

/// Reads the trip page URLs, one per line. Blank lines are ignored.
pub async fn load_links(path: Option<&Path>) -> Result<Vec<String>, CrawlerError> {
    let path = match path {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => {
            return Err(CrawlerError::ConfigurationError(
                "Please provide a link file".to_string(),
            ))
        }
    };

    let content = tokio::fs::read_to_string(path).await?;
    let links: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect();

    debug!("Loaded {} links from {}", links.len(), path.display());
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_path_is_a_configuration_error() {
        assert!(matches!(
            load_links(None).await,
            Err(CrawlerError::ConfigurationError(_))
        ));
        assert!(matches!(
            load_links(Some(Path::new(""))).await,
            Err(CrawlerError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn lines_are_stripped() {
        let path = std::env::temp_dir().join("trip_crawler_links_test.txt");
        tokio::fs::write(
            &path,
            "  https://www.intrepidtravel.com/uk/india/a  \r\n\nhttps://www.intrepidtravel.com/uk/india/b\n",
        )
        .await
        .unwrap();

        let links = load_links(Some(path.as_path())).await.unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.intrepidtravel.com/uk/india/a".to_string(),
                "https://www.intrepidtravel.com/uk/india/b".to_string(),
            ]
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn unreadable_file_fails() {
        let path = PathBuf::from("does/not/exist/links.txt");
        assert!(matches!(
            load_links(Some(path.as_path())).await,
            Err(CrawlerError::IoError(_))
        ));
    }
}
