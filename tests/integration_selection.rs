//! 選択解決の統合テスト
//!
//! 探索したフリートの識別子に対して、番号・名前・`.`・曖昧一致を解決する

mod common;

use common::Fleet;
use gitstat::application::{
    services::{FixedPrompt, Selection, SelectionResolver},
    use_cases::discover_repositories::{DiscoveryConfig, RepositoryDiscovery},
};
use pretty_assertions::assert_eq;

async fn discovered_ids(fleet: &Fleet) -> Vec<String> {
    let discovery = RepositoryDiscovery::new(DiscoveryConfig::new(vec![fleet
        .root()
        .to_string_lossy()
        .into_owned()]));
    discovery.discover().await.registry.ids()
}

fn selected(ids: &[&str]) -> Selection {
    Selection::Selected(ids.iter().map(|id| id.to_string()).collect())
}

#[tokio::test]
async fn test_selectors_against_discovered_fleet() {
    let fleet = Fleet::new();
    for name in ["app-core", "app-ui", "dotfiles", "website"] {
        fleet.local_repo(name);
    }
    let ids = discovered_ids(&fleet).await;
    assert_eq!(ids, vec!["app-core", "app-ui", "dotfiles", "website"]);

    let resolver = SelectionResolver::new().with_current_dir(fleet.root().join("dotfiles"));
    let mut prompt = FixedPrompt::silent();

    assert_eq!(resolver.resolve("website", &ids, &mut prompt), selected(&["website"]));
    assert_eq!(resolver.resolve("2", &ids, &mut prompt), selected(&["app-ui"]));
    assert_eq!(resolver.resolve(".", &ids, &mut prompt), selected(&["dotfiles"]));
    assert_eq!(resolver.resolve("dotfils", &ids, &mut prompt), selected(&["dotfiles"]));
    assert_eq!(
        resolver.resolve("all", &ids, &mut prompt),
        selected(&["app-core", "app-ui", "dotfiles", "website"])
    );
    assert!(resolver.resolve("9", &ids, &mut prompt).is_cancelled());
    assert!(resolver.resolve("zzzzzz", &ids, &mut prompt).is_cancelled());
    assert!(prompt.asked.is_empty());
}

#[tokio::test]
async fn test_interactive_selection_uses_list_numbers() {
    let fleet = Fleet::new();
    for name in ["alpha", "beta", "gamma"] {
        fleet.local_repo(name);
    }
    let ids = discovered_ids(&fleet).await;
    let resolver = SelectionResolver::new();

    let mut prompt = FixedPrompt::new("3");
    assert_eq!(resolver.select_interactively(&ids, &mut prompt), selected(&["gamma"]));
    assert_eq!(prompt.asked, vec![ids.clone()]);

    let mut prompt = FixedPrompt::new("a");
    assert_eq!(
        resolver.select_interactively(&ids, &mut prompt),
        selected(&["alpha", "beta", "gamma"])
    );

    let mut prompt = FixedPrompt::new("cancel");
    assert!(resolver.select_interactively(&ids, &mut prompt).is_cancelled());

    let mut prompt = FixedPrompt::silent();
    assert!(resolver.select_interactively(&ids, &mut prompt).is_cancelled());
}

#[tokio::test]
async fn test_empty_fleet_selects_nothing() {
    let fleet = Fleet::new();
    std::fs::create_dir_all(fleet.root()).unwrap();
    let ids = discovered_ids(&fleet).await;
    assert!(ids.is_empty());

    let mut prompt = FixedPrompt::new("all");
    assert!(SelectionResolver::new()
        .resolve("all", &ids, &mut prompt)
        .is_cancelled());
}
