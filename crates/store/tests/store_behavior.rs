use ym_domain::agent::{AgentCategory, AgentPatch, NewAgent};
use ym_domain::chat::NewChat;
use ym_domain::error::Error;
use ym_domain::grounding::{FileType, NewDocument};
use ym_domain::message::Message;
use ym_store::{JsonStore, Store};

fn agent(name: &str, category: Option<AgentCategory>) -> NewAgent {
    NewAgent {
        name: name.into(),
        description: format!("{name} agent"),
        system_prompt: "You help.".into(),
        temperature: None,
        model: None,
        functions: vec![],
        icon: None,
        category,
        is_default: false,
    }
}

fn document(name: &str, content: &str) -> NewDocument {
    NewDocument {
        name: name.into(),
        description: String::new(),
        content: content.into(),
        file_type: FileType::Text,
    }
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let agent_id;
    {
        let store = JsonStore::open(dir.path()).unwrap();
        agent_id = store.create_agent(agent("Writer", None)).await.unwrap().id;
        store
            .create_document(&agent_id, document("Style", "Short sentences."))
            .await
            .unwrap();
        store
            .create_url(&agent_id, "https://example.org".into(), "page".into())
            .await
            .unwrap();
    }

    let store = JsonStore::open(dir.path()).unwrap();
    assert_eq!(store.find_agent(&agent_id).await.unwrap().name, "Writer");
    assert_eq!(store.list_documents(&agent_id).await.unwrap().len(), 1);
    assert_eq!(store.list_urls(&agent_id).await.unwrap().len(), 1);
    assert!(!dir.path().join("store.json.tmp").exists());
}

#[tokio::test]
async fn corrupt_state_file_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("store.json"), "{ not json").unwrap();
    let err = JsonStore::open(dir.path()).err().unwrap();
    assert!(matches!(err, Error::Store(_)));
}

#[tokio::test]
async fn grounding_is_scoped_to_its_agent() {
    let store = JsonStore::in_memory();
    let a = store.create_agent(agent("A", None)).await.unwrap();
    let b = store.create_agent(agent("B", None)).await.unwrap();

    let doc = store
        .create_document(&a.id, document("Pricing", "$10/month"))
        .await
        .unwrap();
    store
        .create_url(&b.id, "https://b.example".into(), "b page".into())
        .await
        .unwrap();

    assert_eq!(store.list_documents(&a.id).await.unwrap().len(), 1);
    assert!(store.list_documents(&b.id).await.unwrap().is_empty());
    assert!(store.list_urls(&a.id).await.unwrap().is_empty());

    // Deleting through the wrong agent does not touch the document.
    let err = store.delete_document(&b.id, &doc.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "document", .. }));
    assert!(store.find_document(&doc.id).await.is_ok());

    store.delete_document(&a.id, &doc.id).await.unwrap();
    assert!(store.find_document(&doc.id).await.is_err());
}

#[tokio::test]
async fn grounding_requires_an_existing_agent() {
    let store = JsonStore::in_memory();
    let err = store
        .create_document("missing", document("x", "y"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "agent", .. }));

    let err = store
        .create_url("missing", "https://x".into(), String::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "agent", .. }));
}

#[tokio::test]
async fn documents_need_name_and_content() {
    let store = JsonStore::in_memory();
    let a = store.create_agent(agent("A", None)).await.unwrap();
    let err = store
        .create_document(&a.id, document("", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = store
        .create_document(&a.id, document("name", " "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn deleting_an_agent_cascades_to_its_grounding() {
    let store = JsonStore::in_memory();
    let a = store.create_agent(agent("A", None)).await.unwrap();
    let b = store.create_agent(agent("B", None)).await.unwrap();
    let doc = store
        .create_document(&a.id, document("d", "c"))
        .await
        .unwrap();
    let url = store
        .create_url(&a.id, "https://a".into(), "c".into())
        .await
        .unwrap();
    let kept = store
        .create_document(&b.id, document("kept", "c"))
        .await
        .unwrap();

    store.delete_agent(&a.id).await.unwrap();

    assert!(store.find_agent(&a.id).await.is_err());
    assert!(store.find_document(&doc.id).await.is_err());
    assert!(store.find_url(&url.id).await.is_err());
    assert!(store.find_document(&kept.id).await.is_ok());
}

#[tokio::test]
async fn default_agents_are_protected() {
    let store = JsonStore::in_memory();
    let mut seed = agent("Built-in", None);
    seed.is_default = true;
    let builtin = store.seed_agent(seed).unwrap().unwrap();

    let patch = AgentPatch {
        name: Some("Renamed".into()),
        ..Default::default()
    };
    let err = store.update_agent(&builtin.id, patch).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let err = store.delete_agent(&builtin.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(store.find_agent(&builtin.id).await.unwrap().name, "Built-in");
}

#[tokio::test]
async fn agents_list_newest_first_and_filter_by_category() {
    let store = JsonStore::in_memory();
    let first = store
        .create_agent(agent("First", Some(AgentCategory::Seo)))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = store.create_agent(agent("Second", None)).await.unwrap();

    let all = store.list_agents(None).await.unwrap();
    let ids: Vec<_> = all.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

    let seo = store.list_agents(Some(AgentCategory::Seo)).await.unwrap();
    assert_eq!(seo.len(), 1);
    assert_eq!(seo[0].id, first.id);
}

#[tokio::test]
async fn update_applies_patch_and_bumps_updated_at() {
    let store = JsonStore::in_memory();
    let a = store.create_agent(agent("A", None)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let patch: AgentPatch = serde_json::from_str(r#"{"temperature":1.2}"#).unwrap();
    let updated = store.update_agent(&a.id, patch).await.unwrap();
    assert_eq!(updated.temperature.value(), 1.2);
    assert_eq!(updated.name, "A");
    assert!(updated.updated_at > a.updated_at);
}

#[tokio::test]
async fn chats_append_and_order_by_activity() {
    let store = JsonStore::in_memory();
    let older = store
        .create_chat(NewChat {
            title: "older".into(),
            agent_id: None,
            messages: vec![],
            model: None,
        })
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = store
        .create_chat(NewChat {
            title: "newer".into(),
            agent_id: None,
            messages: vec![],
            model: None,
        })
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let chat = store
        .append_message(&older.id, Message::user("hello"))
        .await
        .unwrap();
    assert_eq!(chat.messages.len(), 1);

    let ids: Vec<_> = store
        .list_chats()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![older.id.clone(), newer.id.clone()]);

    store.delete_chat(&newer.id).await.unwrap();
    assert!(matches!(
        store.delete_chat(&newer.id).await.unwrap_err(),
        Error::NotFound { kind: "chat", .. }
    ));
}

#[tokio::test]
async fn chat_with_unknown_agent_is_rejected() {
    let store = JsonStore::in_memory();
    let err = store
        .create_chat(NewChat {
            title: "t".into(),
            agent_id: Some("ghost".into()),
            messages: vec![],
            model: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "agent", .. }));
}

#[tokio::test]
async fn failed_write_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let kept = store.create_agent(agent("Kept", None)).await.unwrap();
    store
        .create_document(&kept.id, document("Notes", "body"))
        .await
        .unwrap();

    // A directory in place of the state file makes every rename fail.
    let file = dir.path().join("store.json");
    std::fs::remove_file(&file).unwrap();
    std::fs::create_dir(&file).unwrap();
    std::fs::write(file.join("occupied"), "x").unwrap();

    assert!(store.create_agent(agent("Lost", None)).await.is_err());
    assert_eq!(store.list_agents(None).await.unwrap().len(), 1);

    let patch = AgentPatch {
        name: Some("Renamed".into()),
        ..Default::default()
    };
    assert!(store.update_agent(&kept.id, patch).await.is_err());
    assert_eq!(store.find_agent(&kept.id).await.unwrap().name, "Kept");

    assert!(store.delete_agent(&kept.id).await.is_err());
    assert!(store.find_agent(&kept.id).await.is_ok());
    assert_eq!(store.list_documents(&kept.id).await.unwrap().len(), 1);

    assert!(store
        .create_chat(NewChat {
            title: "t".into(),
            agent_id: None,
            messages: vec![Message::user("hi")],
            model: None,
        })
        .await
        .is_err());
    assert!(store.list_chats().await.unwrap().is_empty());
}
