use super::*;
use std::time::Duration;

#[tokio::test]
async fn distinct_paths_do_not_contend() {
    let locks = FileLocks::new();
    let _a = locks.lock("a.rs").await;
    let _b = locks.lock("b.rs").await;
}

#[tokio::test]
async fn same_path_serializes() {
    let locks = Arc::new(FileLocks::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let locks2 = locks.clone();
    let order2 = order.clone();
    let first = tokio::spawn(async move {
        let _guard = locks2.lock("shared.rs").await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        order2.lock().unwrap().push("first");
    });

    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = {
        let locks = locks.clone();
        let order = order.clone();
        tokio::spawn(async move {
            let _guard = locks.lock("shared.rs").await;
            order.lock().unwrap().push("second");
        })
    };

    first.await.unwrap();
    second.await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}
