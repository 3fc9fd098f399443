#![no_main]
use libfuzzer_sys::fuzz_target;
use radix_router::Router;

fuzz_target!(|data: (Vec<(String, i32)>, String)| {
    let mut router = Router::new();

    for (route, item) in data.0 {
        if router.insert(route, item).is_err() {
            return;
        }
    }

    router.check_priorities().unwrap();
    let _ = router.at(&data.1);
});
