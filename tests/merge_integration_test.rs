use anyhow::Result;
use lead_merge::utils::error::LeadError;
use lead_merge::{EtlEngine, LocalStorage, MergeConfig, MergePipeline};
use tempfile::TempDir;

fn storage_for(dir: &TempDir) -> LocalStorage {
    LocalStorage::new(dir.path().to_str().unwrap().to_string())
}

async fn run_merge(dir: &TempDir, config: MergeConfig) -> lead_merge::Result<String> {
    let pipeline = MergePipeline::new(storage_for(dir), config);
    EtlEngine::new_with_monitoring(pipeline, false).run().await
}

fn read_output(dir: &TempDir, name: &str) -> String {
    std::fs::read_to_string(dir.path().join(name)).unwrap()
}

#[tokio::test]
async fn test_secondary_rows_only_join_primary_domains() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("updated_leads.csv"),
        "Domain,Full Name,Source\na.com,Jo Smith,primary\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust_data.csv"),
        "Domain,Full Name,extra\na.com,Jo Smith,x\nb.com,Al Lee,y\n",
    )?;

    let config = MergeConfig::new("updated_leads.csv", "crust_data.csv", "merged.csv");
    let output = run_merge(&temp_dir, config).await?;
    assert_eq!(output, "merged.csv");

    let merged = read_output(&temp_dir, "merged.csv");
    assert_eq!(merged, "Domain,Full Name,Source,extra\na.com,Jo Smith,primary,\n");
    Ok(())
}

#[tokio::test]
async fn test_disjoint_domains_leave_primary_unchanged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let primary = "Domain,Full Name,Title,Source\na.com,Jo Smith,CEO,primary\na.com,Mia Park,CTO,primary\n";
    std::fs::write(temp_dir.path().join("leads.csv"), primary)?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        "Domain,Full Name,Title\nz.com,Al Lee,VP\n",
    )?;

    run_merge(&temp_dir, MergeConfig::new("leads.csv", "crust.csv", "out.csv")).await?;

    assert_eq!(read_output(&temp_dir, "out.csv"), primary);
    Ok(())
}

#[tokio::test]
async fn test_new_people_are_appended_after_primary_group() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.csv"),
        "Domain,Full Name\na.com,Jo Smith\nb.com,Al Lee\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        "Domain,Full Name\nb.com,Kim Cho\na.com,Jo Smith\na.com,Ann Roe\n",
    )?;

    let mut config = MergeConfig::new("leads.csv", "crust.csv", "out.csv");
    config.options.labels.primary = "my_results".to_string();
    config.options.labels.secondary = "crust_data".to_string();
    run_merge(&temp_dir, config).await?;

    assert_eq!(
        read_output(&temp_dir, "out.csv"),
        "Domain,Full Name,Source\n\
         a.com,Jo Smith,my_results\n\
         a.com,Ann Roe,crust_data\n\
         b.com,Al Lee,my_results\n\
         b.com,Kim Cho,crust_data\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_rerun_is_byte_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.csv"),
        "Domain,Full Name,Notes\na.com,Jo Smith,\"likes, commas\"\nb.com,Al Lee,\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        "Domain,Full Name\na.com,Ann Roe\nb.com,Al Lee\n",
    )?;

    run_merge(&temp_dir, MergeConfig::new("leads.csv", "crust.csv", "first.csv")).await?;
    run_merge(&temp_dir, MergeConfig::new("leads.csv", "crust.csv", "second.csv")).await?;

    let first = std::fs::read(temp_dir.path().join("first.csv"))?;
    let second = std::fs::read(temp_dir.path().join("second.csv"))?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_windows_1252_secondary_with_explicit_label() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.csv"),
        "Domain,Full Name\nacme.fr,Jo Smith\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        b"Domain,Full Name\nacme.fr,Ren\xe9 Dupont\n".as_slice(),
    )?;

    let mut config = MergeConfig::new("leads.csv", "crust.csv", "out.csv");
    config.secondary_encoding = Some("windows-1252".to_string());
    run_merge(&temp_dir, config).await?;

    let merged = read_output(&temp_dir, "out.csv");
    assert!(merged.contains("acme.fr,René Dupont,secondary"));
    Ok(())
}

#[tokio::test]
async fn test_sniffed_legacy_secondary_is_written_as_utf8() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.csv"),
        "Domain,Full Name\nacme.fr,Jo Smith\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        b"Domain,Full Name,Title\nacme.fr,H\xe9l\xe8ne C\xf4t\xe9,Directrice g\xe9n\xe9rale\n".as_slice(),
    )?;

    run_merge(&temp_dir, MergeConfig::new("leads.csv", "crust.csv", "out.csv")).await?;

    // read_to_string fails unless the output is valid UTF-8
    let merged = read_output(&temp_dir, "out.csv");
    assert_eq!(merged.lines().count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_missing_column_leaves_no_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.csv"),
        "Domain,Full Name\na.com,Jo Smith\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        "Domain,Name\na.com,Ann Roe\n",
    )?;

    let result = run_merge(&temp_dir, MergeConfig::new("leads.csv", "crust.csv", "out.csv")).await;

    match result {
        Err(LeadError::MissingColumnError { column, input }) => {
            assert_eq!(column, "Full Name");
            assert!(input.contains("crust.csv"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!temp_dir.path().join("out.csv").exists());
    assert!(!temp_dir.path().join(".out.csv.partial").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_is_critical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.csv"),
        "Domain,Full Name\na.com,Jo Smith\n",
    )?;

    let err = run_merge(&temp_dir, MergeConfig::new("leads.csv", "absent.csv", "out.csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, LeadError::FileReadError { .. }));
    assert_eq!(err.severity().exit_code(), 3);
    assert!(!temp_dir.path().join("out.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_tsv_inputs_and_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.tsv"),
        "Domain\tFull Name\na.com\tJo Smith\n",
    )?;
    std::fs::write(
        temp_dir.path().join("crust.csv"),
        "Domain,Full Name\na.com,Ann Roe\n",
    )?;

    run_merge(&temp_dir, MergeConfig::new("leads.tsv", "crust.csv", "out.tsv")).await?;

    assert_eq!(
        read_output(&temp_dir, "out.tsv"),
        "Domain\tFull Name\tSource\na.com\tJo Smith\tprimary\na.com\tAnn Roe\tsecondary\n"
    );
    Ok(())
}
