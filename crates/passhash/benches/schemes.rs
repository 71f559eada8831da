use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use passhash::Scheme;
use passhash::schemes::{Argon2i, Bcrypt, Pbkdf2, Scrypt, Sha2Crypt};

const PASSWORD: &str = "benchmark password";

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");
    group.sample_size(10);

    let schemes: Vec<(&str, Box<dyn Scheme>)> = vec![
        ("argon2i", Box::new(Argon2i::recommended())),
        ("scrypt", Box::new(Scrypt::recommended())),
        ("sha512-crypt", Box::new(Sha2Crypt::sha512())),
        ("pbkdf2-sha256", Box::new(Pbkdf2::sha256())),
        ("bcrypt", Box::new(Bcrypt::recommended())),
    ];
    for (name, scheme) in &schemes {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(scheme.hash(PASSWORD).unwrap()));
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    group.sample_size(10);

    let schemes: Vec<(&str, Box<dyn Scheme>)> = vec![
        ("argon2i", Box::new(Argon2i::recommended())),
        ("scrypt", Box::new(Scrypt::recommended())),
    ];
    for (name, scheme) in &schemes {
        let record = scheme.hash(PASSWORD).unwrap();
        group.bench_function(*name, |b| {
            b.iter(|| black_box(scheme.verify(PASSWORD, &record).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hash, bench_verify);
criterion_main!(benches);
